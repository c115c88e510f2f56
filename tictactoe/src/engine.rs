use engine::{GameEngine, ValidActions};

use super::{Action, GameState, Value};

#[derive(Default)]
pub struct Engine {}

impl Engine {
    pub fn new() -> Self {
        Self {}
    }
}

impl GameEngine for Engine {
    type Action = Action;
    type State = GameState;
    type Terminal = Value;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        game_state.place(action.cell())
    }

    fn player_to_move(&self, game_state: &Self::State) -> usize {
        game_state.player_to_move()
    }

    fn terminal_state(&self, game_state: &Self::State) -> Option<Self::Terminal> {
        game_state.is_terminal()
    }
}

impl ValidActions for Engine {
    type Action = Action;
    type State = GameState;

    fn valid_actions(&self, game_state: &Self::State) -> impl Iterator<Item = Self::Action> {
        let is_terminal = game_state.is_terminal().is_some();

        game_state
            .empty_cells()
            .filter(move |_| !is_terminal)
            .map(|cell| Action::Place(cell as u8))
    }
}
