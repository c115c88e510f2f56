/// Enumerates the legal actions of a state.
///
/// The enumeration order must be deterministic for a given state. Search ties are broken
/// by the position of an action in this order.
pub trait ValidActions {
    type State;
    type Action;

    fn valid_actions(&self, game_state: &Self::State) -> impl Iterator<Item = Self::Action>;
}
