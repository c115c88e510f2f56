use std::fmt::{self, Debug, Display, Formatter};

use engine::{GameEngine, ValidActions};
use generational_arena::Arena;

use crate::{MCTSNode, MctsError, NodeId, Result};

/// Owns the root and every explored descendant.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. A child's parent handle is
/// only used to walk back up the tree; the arena alone owns the nodes.
#[derive(Debug)]
pub struct Tree<S, A> {
    arena: Arena<MCTSNode<S, A>>,
    root: NodeId,
}

impl<S, A> Tree<S, A> {
    /// Creates a tree with a single unexpanded root.
    ///
    /// The root starts with one visit so that every node, the root included, satisfies
    /// `visits == 1 + sum(child visits)` once fully expanded.
    pub fn create_root<E>(game_engine: &E, initial_state: S) -> Result<Self>
    where
        E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    {
        if game_engine.is_terminal(&initial_state) {
            return Err(MctsError::InvalidState(
                "cannot search from a terminal state".to_string(),
            ));
        }

        if game_engine.valid_actions(&initial_state).next().is_none() {
            return Err(MctsError::InvalidState(
                "cannot search from a state without legal actions".to_string(),
            ));
        }

        let player_to_move = game_engine.player_to_move(&initial_state);
        let mut root = MCTSNode::new(
            initial_state,
            None,
            None,
            player_to_move,
            player_to_move,
            false,
        );
        root.increment_visits();

        let mut arena = Arena::new();
        let root = NodeId(arena.insert(root));

        Ok(Self { arena, root })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &MCTSNode<S, A> {
        self.get(self.root)
    }

    /// # Panics
    /// Panics if the id does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &MCTSNode<S, A> {
        &self.arena[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode<S, A> {
        &mut self.arena[id.0]
    }

    pub fn try_get(&self, id: NodeId) -> Option<&MCTSNode<S, A>> {
        self.arena.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &MCTSNode<S, A>> {
        self.get(id).children().iter().map(move |c| self.get(*c))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent()
    }

    /// Ids from `id` up to and including the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;

        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }

        path
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

impl<S, A> Tree<S, A>
where
    A: PartialEq + Debug,
{
    /// Attaches a new child under `parent` for `action`. The parent is marked fully expanded
    /// once every legal action has a child.
    pub fn expand<E>(
        &mut self,
        game_engine: &E,
        parent: NodeId,
        action: A,
        resulting_state: S,
    ) -> Result<NodeId>
    where
        E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    {
        if self.child_of_action(parent, &action).is_some() {
            return Err(MctsError::DuplicateMove(format!("{:?}", action)));
        }

        let reward_player = self.get(parent).player_to_move();
        let player_to_move = game_engine.player_to_move(&resulting_state);
        let is_terminal = game_engine.is_terminal(&resulting_state);

        let child = MCTSNode::new(
            resulting_state,
            Some(action),
            Some(parent),
            player_to_move,
            reward_player,
            is_terminal,
        );

        let child = NodeId(self.arena.insert(child));
        self.get_mut(parent).push_child(child);

        if self.is_fully_expanded(game_engine, parent) {
            self.get_mut(parent).mark_fully_expanded();
        }

        Ok(child)
    }

    /// True when every legal action of the node has a corresponding child.
    pub fn is_fully_expanded<E>(&self, game_engine: &E, id: NodeId) -> bool
    where
        E: ValidActions<State = S, Action = A>,
    {
        let node = self.get(id);
        node.is_terminal()
            || node.children().len() == game_engine.valid_actions(node.game_state()).count()
    }

    pub fn child_of_action(&self, id: NodeId, action: &A) -> Option<NodeId> {
        self.get(id)
            .children()
            .iter()
            .copied()
            .find(|c| self.get(*c).action() == Some(action))
    }
}

impl<S, A> Tree<S, A>
where
    A: Clone,
{
    /// Follows the most visited child from the root, returning the actions along the way.
    pub fn principal_variation(&self) -> Vec<A> {
        let mut actions = Vec::new();
        let mut current = self.root;

        while let Some(child) = self.robust_child(current) {
            if let Some(action) = self.get(child).action() {
                actions.push(action.clone());
            }
            current = child;
        }

        actions
    }

    /// The most visited child. Ties go to the higher mean reward, then to the lowest action index.
    pub fn robust_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32, f32)> = None;

        for &child in self.get(id).children() {
            let node = self.get(child);
            let visits = node.visits();
            let mean = node.mean_reward().unwrap_or(f32::NEG_INFINITY);

            let is_better = match best {
                None => true,
                Some((_, best_visits, best_mean)) => {
                    visits > best_visits || (visits == best_visits && mean > best_mean)
                }
            };

            if is_better {
                best = Some((child, visits, mean));
            }
        }

        best.map(|(child, _, _)| child)
    }
}

impl<S, A: Debug> Display for Tree<S, A> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fn fmt_subtree<S, A: Debug>(
            f: &mut Formatter,
            tree: &Tree<S, A>,
            id: NodeId,
            depth: usize,
        ) -> fmt::Result {
            let node = tree.get(id);
            let indent = "    ".repeat(depth);

            match node.action() {
                Some(action) => writeln!(
                    f,
                    "{}{:?} W={:.2} N={}",
                    indent,
                    action,
                    node.reward(),
                    node.visits()
                )?,
                None => writeln!(f, "{}Root W={:.2} N={}", indent, node.reward(), node.visits())?,
            }

            for child in node.children() {
                fmt_subtree(f, tree, *child, depth + 1)?;
            }

            Ok(())
        }

        fmt_subtree(f, self, self.root, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting_game::{CountingAction, CountingGameEngine, CountingGameState};

    fn create_tree() -> (CountingGameEngine, Tree<CountingGameState, CountingAction>) {
        let game_engine = CountingGameEngine::new();
        let tree = Tree::create_root(&game_engine, CountingGameState::initial()).unwrap();
        (game_engine, tree)
    }

    #[test]
    fn test_create_root_has_single_unexpanded_node() {
        let (game_engine, tree) = create_tree();
        let root = tree.root_node();

        assert_eq!(tree.len(), 1);
        assert_eq!(root.visits(), 1);
        assert!(root.action().is_none());
        assert!(root.parent().is_none());
        assert!(!root.is_terminal());
        assert!(!tree.is_fully_expanded(&game_engine, tree.root()));
    }

    #[test]
    fn test_create_root_rejects_terminal_state() {
        let game_engine = CountingGameEngine::new();
        let state = CountingGameState::new(true, 0);

        let res = Tree::create_root(&game_engine, state);

        assert!(matches!(res, Err(MctsError::InvalidState(_))));
    }

    #[test]
    fn test_expand_attaches_child_with_parent_perspective() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();
        let state =
            game_engine.take_action(tree.get(root).game_state(), &CountingAction::Increment);

        let child = tree
            .expand(&game_engine, root, CountingAction::Increment, state)
            .unwrap();

        let child_node = tree.get(child);
        assert_eq!(tree.len(), 2);
        assert_eq!(child_node.parent(), Some(root));
        assert_eq!(child_node.action(), Some(&CountingAction::Increment));
        assert_eq!(child_node.reward_player(), 1);
        assert_eq!(child_node.player_to_move(), 2);
        assert_eq!(child_node.visits(), 0);
        assert_eq!(tree.get(root).children(), &[child]);
    }

    #[test]
    fn test_expand_rejects_duplicate_action() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();
        let state = game_engine.take_action(tree.get(root).game_state(), &CountingAction::Stay);

        tree.expand(&game_engine, root, CountingAction::Stay, state.clone())
            .unwrap();
        let res = tree.expand(&game_engine, root, CountingAction::Stay, state);

        assert!(matches!(res, Err(MctsError::DuplicateMove(_))));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_is_fully_expanded_after_every_action() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();

        for action in [
            CountingAction::Increment,
            CountingAction::Decrement,
            CountingAction::Stay,
        ] {
            assert!(!tree.is_fully_expanded(&game_engine, root));
            let state = game_engine.take_action(tree.get(root).game_state(), &action);
            tree.expand(&game_engine, root, action, state).unwrap();
        }

        assert!(tree.is_fully_expanded(&game_engine, root));
        assert!(tree.get(root).is_fully_expanded());
    }

    #[test]
    fn test_expand_into_terminal_state_marks_child_terminal() {
        let game_engine = CountingGameEngine::new();
        let mut tree = Tree::create_root(&game_engine, CountingGameState::new(true, 3)).unwrap();
        let root = tree.root();
        let state =
            game_engine.take_action(tree.get(root).game_state(), &CountingAction::Increment);

        let child = tree
            .expand(&game_engine, root, CountingAction::Increment, state)
            .unwrap();

        assert!(tree.get(child).is_terminal());
        assert!(tree.is_fully_expanded(&game_engine, child));
    }

    fn expand_action(
        game_engine: &CountingGameEngine,
        tree: &mut Tree<CountingGameState, CountingAction>,
        parent: NodeId,
        action: CountingAction,
    ) -> NodeId {
        let state = game_engine.take_action(tree.get(parent).game_state(), &action);
        tree.expand(game_engine, parent, action, state).unwrap()
    }

    #[test]
    fn test_robust_child_prefers_most_visits() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();
        let increment = expand_action(&game_engine, &mut tree, root, CountingAction::Increment);
        let decrement = expand_action(&game_engine, &mut tree, root, CountingAction::Decrement);

        tree.get_mut(increment).increment_visits();
        tree.get_mut(increment).add_reward(1.0);
        for _ in 0..2 {
            tree.get_mut(decrement).increment_visits();
        }

        assert_eq!(tree.robust_child(root), Some(decrement));
    }

    #[test]
    fn test_robust_child_equal_visits_prefers_higher_mean() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();
        let increment = expand_action(&game_engine, &mut tree, root, CountingAction::Increment);
        let decrement = expand_action(&game_engine, &mut tree, root, CountingAction::Decrement);

        for (id, reward) in [(increment, 0.5), (decrement, 1.5)] {
            tree.get_mut(id).increment_visits();
            tree.get_mut(id).increment_visits();
            tree.get_mut(id).add_reward(reward);
        }

        assert_eq!(tree.robust_child(root), Some(decrement));
    }

    #[test]
    fn test_robust_child_full_tie_prefers_lowest_index() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();
        let increment = expand_action(&game_engine, &mut tree, root, CountingAction::Increment);
        let decrement = expand_action(&game_engine, &mut tree, root, CountingAction::Decrement);
        let stay = expand_action(&game_engine, &mut tree, root, CountingAction::Stay);

        for id in [increment, decrement, stay] {
            tree.get_mut(id).increment_visits();
            tree.get_mut(id).add_reward(0.5);
        }

        assert_eq!(tree.robust_child(root), Some(increment));
    }

    #[test]
    fn test_robust_child_of_unexpanded_node_is_none() {
        let (_, tree) = create_tree();

        assert_eq!(tree.robust_child(tree.root()), None);
    }

    #[test]
    fn test_path_to_root() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();
        let state = game_engine.take_action(tree.get(root).game_state(), &CountingAction::Stay);
        let child = tree.expand(&game_engine, root, CountingAction::Stay, state).unwrap();
        let state = game_engine.take_action(tree.get(child).game_state(), &CountingAction::Stay);
        let grandchild = tree.expand(&game_engine, child, CountingAction::Stay, state).unwrap();

        assert_eq!(tree.path_to_root(grandchild), vec![grandchild, child, root]);
        assert_eq!(tree.path_to_root(root), vec![root]);
    }

    #[test]
    fn test_display_indents_children() {
        let (game_engine, mut tree) = create_tree();
        let root = tree.root();
        let state = game_engine.take_action(tree.get(root).game_state(), &CountingAction::Stay);
        tree.expand(&game_engine, root, CountingAction::Stay, state).unwrap();

        let output = tree.to_string();

        assert_eq!(output, "Root W=0.00 N=1\n    Stay W=0.00 N=0\n");
    }
}
