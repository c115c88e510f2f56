use super::value::Value;

/// The rules of a turn-based, perfect-information game.
///
/// Implementations must be pure: applying an action produces a new state and leaves the
/// input untouched. Players are identified by ids starting at 1.
pub trait GameEngine {
    type Action;
    type State;
    type Terminal: Value;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State;

    fn player_to_move(&self, game_state: &Self::State) -> usize;

    /// Returns the outcome of the game if the state is terminal, `None` otherwise.
    fn terminal_state(&self, game_state: &Self::State) -> Option<Self::Terminal>;

    fn is_terminal(&self, game_state: &Self::State) -> bool {
        self.terminal_state(game_state).is_some()
    }
}
