//! Multi-threaded search using virtual loss.
//!
//! Workers share one tree behind a lock. A worker holds the lock while it selects and expands,
//! marking every node on its path with a virtual loss (one visit, no reward). It then releases
//! the lock for the rollout and re-acquires it to replace the virtual loss with the real
//! outcome. The placeholder steers concurrent workers towards other paths, which makes the
//! statistics seen during selection an approximation of the sequential search. Results are
//! therefore not reproducible across runs even with a fixed seed.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use common::create_rng;
use engine::{GameEngine, ValidActions};
use log::{debug, warn};
use parking_lot::Mutex;

use crate::backpropagation::{apply_virtual_loss, backpropagate_virtual_loss, revert_virtual_loss};
use crate::mcts::select_and_expand;
use crate::rollout::{simulate, RolloutPolicy};
use crate::{CancellationToken, Result, SearchConfig, Tree, UCT};

struct Workers<'a, 't, E, R, S, A> {
    game_engine: &'a E,
    rollout_policy: &'a R,
    selection_policy: UCT,
    tree: Mutex<&'t mut Tree<S, A>>,
    config: &'a SearchConfig,
    cancel: &'a CancellationToken,
    start: Instant,
    started: AtomicUsize,
    completed: AtomicUsize,
    stop: AtomicBool,
    cancelled: AtomicBool,
}

impl<S, A, E, R> Workers<'_, '_, E, R, S, A>
where
    S: Clone,
    A: PartialEq + Debug,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    R: RolloutPolicy<State = S, Action = A>,
{
    /// Runs iterations until the shared budget is spent. Returns the deepest path seen.
    fn run_worker(&self, worker: usize) -> Result<usize> {
        let mut rng = create_rng(self.config.seed.map(|s| s.wrapping_add(worker as u64)));
        let mut max_depth = 0;

        debug!("Starting search worker {}", worker);

        while !self.stop.load(Ordering::SeqCst) {
            if let Some(max_iterations) = self.config.iterations {
                if self.started.fetch_add(1, Ordering::SeqCst) >= max_iterations {
                    break;
                }
            }

            let depth = self.iteration(&mut rng).map_err(|err| {
                warn!("Search worker {} failed: {}", worker, err);
                self.stop.store(true, Ordering::SeqCst);
                err
            })?;
            max_depth = max_depth.max(depth);
            self.completed.fetch_add(1, Ordering::SeqCst);

            if self.cancel.is_cancelled() {
                self.cancelled.store(true, Ordering::SeqCst);
                self.stop.store(true, Ordering::SeqCst);
            }

            if let Some(max_time) = self.config.time {
                if self.start.elapsed() >= max_time {
                    self.stop.store(true, Ordering::SeqCst);
                }
            }
        }

        Ok(max_depth)
    }

    fn iteration<G: rand::Rng>(&self, rng: &mut G) -> Result<usize> {
        let (path, leaf_state) = {
            let mut guard = self.tree.lock();
            let tree: &mut Tree<S, A> = &mut guard;
            let path = select_and_expand(self.game_engine, tree, &self.selection_policy)?;
            apply_virtual_loss(tree, &path);
            let leaf_state = tree.get(path[path.len() - 1]).game_state().clone();
            (path, leaf_state)
        };

        match simulate(self.game_engine, &leaf_state, self.rollout_policy, rng) {
            Ok(outcome) => {
                let mut guard = self.tree.lock();
                let tree: &mut Tree<S, A> = &mut guard;
                backpropagate_virtual_loss(tree, &path, &outcome);
                Ok(path.len())
            }
            Err(err) => {
                let mut guard = self.tree.lock();
                let tree: &mut Tree<S, A> = &mut guard;
                revert_virtual_loss(tree, &path);
                Err(err)
            }
        }
    }
}

/// Returns the completed iterations, the max depth, and whether the search was cancelled.
pub(crate) fn search_parallel<S, A, E, R>(
    game_engine: &E,
    rollout_policy: &R,
    tree: &mut Tree<S, A>,
    config: &SearchConfig,
    cancel: &CancellationToken,
    start: Instant,
) -> Result<(usize, usize, bool)>
where
    S: Clone + Send + Sync,
    A: PartialEq + Debug + Send + Sync,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A> + Sync,
    R: RolloutPolicy<State = S, Action = A> + Sync,
{
    let workers = Workers {
        game_engine,
        rollout_policy,
        selection_policy: UCT::new(config.exploration_constant),
        tree: Mutex::new(tree),
        config,
        cancel,
        start,
        started: AtomicUsize::new(0),
        completed: AtomicUsize::new(0),
        stop: AtomicBool::new(false),
        cancelled: AtomicBool::new(false),
    };

    let results = crossbeam::scope(|s| {
        let handles: Vec<_> = (0..config.parallelism)
            .map(|worker| {
                let workers = &workers;
                s.spawn(move |_| workers.run_worker(worker))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

    let mut max_depth = 0;
    for result in results {
        max_depth = max_depth.max(result?);
    }

    Ok((
        workers.completed.load(Ordering::SeqCst),
        max_depth,
        workers.cancelled.load(Ordering::SeqCst),
    ))
}
