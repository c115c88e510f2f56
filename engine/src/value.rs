/// The outcome of a finished game, scored per player.
///
/// Scores are expected in `[0, 1]`: 1 for a win, 0.5 for a draw and 0 for a loss.
pub trait Value: Clone {
    fn get_value_for_player(&self, player: usize) -> f32;
}
