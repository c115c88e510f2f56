use std::fmt::Debug;
use std::time::{Duration, Instant};

use common::create_rng;
use engine::{GameEngine, ValidActions};
use log::{debug, info};
use rand::Rng;

use crate::backpropagation::backpropagate;
use crate::parallel::search_parallel;
use crate::rollout::{simulate, RandomRollout, RolloutPolicy};
use crate::{
    CancellationToken, EdgeInfo, MctsError, NodeId, Result, SearchConfig, SelectionPolicy, Tree,
    UCT,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Running,
    Exhausted,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchSummary {
    pub iterations: usize,
    pub max_depth: usize,
    pub elapsed: Duration,
    pub status: SearchStatus,
}

/// What a single select, expand, simulate, backpropagate cycle did.
#[derive(Clone, Debug)]
pub struct IterationRecord<V> {
    /// Nodes updated by the cycle, from the root to the expanded or terminal leaf.
    pub path: Vec<NodeId>,
    pub outcome: V,
}

/// Random-rollout Monte Carlo tree search over any game implementing the engine traits.
pub struct SearchEngine<'a, E, R> {
    game_engine: &'a E,
    rollout_policy: R,
    status: SearchStatus,
}

impl<'a, E> SearchEngine<'a, E, RandomRollout<E::State, E::Action>>
where
    E: GameEngine,
{
    pub fn new(game_engine: &'a E) -> Self {
        Self::with_rollout_policy(game_engine, RandomRollout::new())
    }
}

impl<'a, E, R> SearchEngine<'a, E, R> {
    pub fn with_rollout_policy(game_engine: &'a E, rollout_policy: R) -> Self {
        Self {
            game_engine,
            rollout_policy,
            status: SearchStatus::Idle,
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    fn transition(&mut self, status: SearchStatus) {
        debug!("Search status {:?} -> {:?}", self.status, status);
        self.status = status;
    }
}

impl<'a, S, A, E, R> SearchEngine<'a, E, R>
where
    S: Clone + Send + Sync,
    A: Clone + PartialEq + Debug + Send + Sync,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A> + Sync,
    R: RolloutPolicy<State = S, Action = A> + Sync,
{
    /// Searches from `initial_state` until the budget is spent and returns the best action.
    pub fn run(&mut self, initial_state: S, config: &SearchConfig) -> Result<A> {
        self.run_with_cancellation(initial_state, config, &CancellationToken::new())
    }

    /// As [`run`](Self::run), stopping early once `cancel` is signalled. A cancelled search
    /// still returns the best action found so far.
    pub fn run_with_cancellation(
        &mut self,
        initial_state: S,
        config: &SearchConfig,
        cancel: &CancellationToken,
    ) -> Result<A> {
        config.validate()?;
        let mut tree = Tree::create_root(self.game_engine, initial_state)?;

        self.search(&mut tree, config, cancel)?;

        let action = best_action(&tree);
        debug!("Principal variation: {:?}", tree.principal_variation());
        self.transition(SearchStatus::Idle);

        action
    }

    /// Runs iterations against an existing tree until the budget is spent or `cancel` is
    /// signalled. Both conditions are checked only between complete iterations.
    pub fn search(
        &mut self,
        tree: &mut Tree<S, A>,
        config: &SearchConfig,
        cancel: &CancellationToken,
    ) -> Result<SearchSummary> {
        config.validate()?;
        self.transition(SearchStatus::Running);

        let start = Instant::now();
        let res = if config.parallelism > 1 {
            search_parallel(
                self.game_engine,
                &self.rollout_policy,
                tree,
                config,
                cancel,
                start,
            )
        } else {
            self.search_sequential(tree, config, cancel, start)
        };

        let (iterations, max_depth, cancelled) = match res {
            Ok(res) => res,
            Err(err) => {
                self.transition(SearchStatus::Idle);
                return Err(err);
            }
        };

        let status = if cancelled {
            SearchStatus::Cancelled
        } else {
            SearchStatus::Exhausted
        };
        self.transition(status);

        let elapsed = start.elapsed();
        info!(
            "Search {:?} after {} iterations in {:?}, max depth {}, {} nodes",
            status,
            iterations,
            elapsed,
            max_depth,
            tree.len()
        );

        Ok(SearchSummary {
            iterations,
            max_depth,
            elapsed,
            status,
        })
    }

    fn search_sequential(
        &self,
        tree: &mut Tree<S, A>,
        config: &SearchConfig,
        cancel: &CancellationToken,
        start: Instant,
    ) -> Result<(usize, usize, bool)> {
        let selection_policy = UCT::new(config.exploration_constant);
        let mut rng = create_rng(config.seed);
        let progress = self.progress(tree, &selection_policy, &mut rng);

        let mut iterations = 0;
        let mut max_depth = 0;

        for record in progress {
            let record = record?;
            iterations += 1;
            max_depth = max_depth.max(record.path.len());

            if cancel.is_cancelled() {
                return Ok((iterations, max_depth, true));
            }

            if is_budget_spent(config, iterations, start) {
                break;
            }
        }

        Ok((iterations, max_depth, false))
    }

    /// A lazy sequence of iterations against `tree`. Each call to `next` runs one full cycle.
    ///
    /// The sequence never ends on its own; it yields `None` only after an error.
    pub fn progress<'t, P, G>(
        &'t self,
        tree: &'t mut Tree<S, A>,
        selection_policy: &'t P,
        rng: &'t mut G,
    ) -> Progress<'t, E, R, P, G, S, A>
    where
        P: SelectionPolicy,
        G: Rng,
    {
        Progress {
            game_engine: self.game_engine,
            rollout_policy: &self.rollout_policy,
            selection_policy,
            tree,
            rng,
            failed: false,
        }
    }
}

pub struct Progress<'t, E, R, P, G, S, A> {
    game_engine: &'t E,
    rollout_policy: &'t R,
    selection_policy: &'t P,
    tree: &'t mut Tree<S, A>,
    rng: &'t mut G,
    failed: bool,
}

impl<S, A, E, R, P, G> Progress<'_, E, R, P, G, S, A> {
    pub fn tree(&self) -> &Tree<S, A> {
        self.tree
    }
}

impl<S, A, E, R, P, G> Iterator for Progress<'_, E, R, P, G, S, A>
where
    S: Clone,
    A: Clone + PartialEq + Debug,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    R: RolloutPolicy<State = S, Action = A>,
    P: SelectionPolicy,
    G: Rng,
{
    type Item = Result<IterationRecord<E::Terminal>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let record = run_iteration(
            self.game_engine,
            self.rollout_policy,
            self.selection_policy,
            self.tree,
            self.rng,
        );

        self.failed = record.is_err();
        Some(record)
    }
}

/// The action of the root's most visited child. Ties go to the higher mean reward, then to
/// the action enumerated first.
pub fn best_action<S, A: Clone>(tree: &Tree<S, A>) -> Result<A> {
    tree.robust_child(tree.root())
        .and_then(|child| tree.get(child).action().cloned())
        .ok_or(MctsError::EmptyTree)
}

fn is_budget_spent(config: &SearchConfig, iterations: usize, start: Instant) -> bool {
    config.iterations.map_or(false, |max| iterations >= max)
        || config.time.map_or(false, |max| start.elapsed() >= max)
}

fn run_iteration<S, A, E, R, P, G>(
    game_engine: &E,
    rollout_policy: &R,
    selection_policy: &P,
    tree: &mut Tree<S, A>,
    rng: &mut G,
) -> Result<IterationRecord<E::Terminal>>
where
    S: Clone,
    A: Clone + PartialEq + Debug,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    R: RolloutPolicy<State = S, Action = A>,
    P: SelectionPolicy,
    G: Rng,
{
    let path = select_and_expand(game_engine, tree, selection_policy)?;
    let leaf = path[path.len() - 1];
    let outcome = simulate(game_engine, tree.get(leaf).game_state(), rollout_policy, rng)?;

    backpropagate(tree, &path, &outcome);

    Ok(IterationRecord { path, outcome })
}

/// Descends from the root with the selection policy until reaching a terminal node or a node
/// with unexpanded actions, expanding one child in the latter case.
pub(crate) fn select_and_expand<S, A, E, P>(
    game_engine: &E,
    tree: &mut Tree<S, A>,
    selection_policy: &P,
) -> Result<Vec<NodeId>>
where
    A: PartialEq + Debug,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    P: SelectionPolicy,
{
    let mut current = tree.root();
    let mut path = vec![current];

    loop {
        let node = tree.get(current);

        if node.is_terminal() {
            return Ok(path);
        }

        if !node.is_fully_expanded() {
            let child = expand_next_action(game_engine, tree, current)?;
            path.push(child);
            return Ok(path);
        }

        let children = node.children();
        let edges = children.iter().map(|c| {
            let child = tree.get(*c);
            EdgeInfo {
                visits: child.visits(),
                reward: child.reward(),
            }
        });

        let selected = selection_policy
            .select_child(node.visits(), edges)
            .ok_or_else(|| {
                MctsError::Precondition(
                    "fully expanded non-terminal node has no children".to_string(),
                )
            })?;

        current = children[selected];
        path.push(current);
    }
}

/// Expands the first enumerated action that has no child yet.
fn expand_next_action<S, A, E>(
    game_engine: &E,
    tree: &mut Tree<S, A>,
    id: NodeId,
) -> Result<NodeId>
where
    A: PartialEq + Debug,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
{
    let (action, resulting_state) = {
        let game_state = tree.get(id).game_state();
        let action = game_engine
            .valid_actions(game_state)
            .find(|a| tree.child_of_action(id, a).is_none())
            .ok_or_else(|| {
                MctsError::Precondition("non-terminal state has no unexpanded actions".to_string())
            })?;
        let resulting_state = game_engine.take_action(game_state, &action);

        (action, resulting_state)
    };

    tree.expand(game_engine, id, action, resulting_state)
}
