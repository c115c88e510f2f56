use generational_arena::Index;

/// Stable handle to a node stored in a [`Tree`](crate::Tree).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(pub(crate) Index);

/// One explored position in the search tree.
///
/// `reward` is accumulated from the perspective of `reward_player`, the player who chose the
/// action leading into this node. The root has no incoming action and accumulates from the
/// perspective of its own player to move.
#[derive(Debug)]
pub struct MCTSNode<S, A> {
    game_state: S,
    action: Option<A>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visits: u32,
    reward: f32,
    player_to_move: usize,
    reward_player: usize,
    is_terminal: bool,
    is_fully_expanded: bool,
}

impl<S, A> MCTSNode<S, A> {
    pub(crate) fn new(
        game_state: S,
        action: Option<A>,
        parent: Option<NodeId>,
        player_to_move: usize,
        reward_player: usize,
        is_terminal: bool,
    ) -> Self {
        Self {
            game_state,
            action,
            parent,
            children: Vec::new(),
            visits: 0,
            reward: 0.0,
            player_to_move,
            reward_player,
            is_terminal,
            is_fully_expanded: is_terminal,
        }
    }

    pub fn game_state(&self) -> &S {
        &self.game_state
    }

    pub fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in expansion order, which is also the order the game enumerates actions in.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn reward(&self) -> f32 {
        self.reward
    }

    /// Mean reward, or `None` for a node that has not been visited yet.
    pub fn mean_reward(&self) -> Option<f32> {
        if self.visits == 0 {
            None
        } else {
            Some(self.reward / self.visits as f32)
        }
    }

    pub fn player_to_move(&self) -> usize {
        self.player_to_move
    }

    pub fn reward_player(&self) -> usize {
        self.reward_player
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Set once every legal action of the node has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.is_fully_expanded
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn mark_fully_expanded(&mut self) {
        self.is_fully_expanded = true;
    }

    pub(crate) fn increment_visits(&mut self) {
        self.visits += 1;
    }

    pub(crate) fn decrement_visits(&mut self) {
        debug_assert!(self.visits > 0, "Visits should never drop below zero");
        self.visits = self.visits.saturating_sub(1);
    }

    pub(crate) fn add_reward(&mut self, reward: f32) {
        self.reward += reward;
    }
}
