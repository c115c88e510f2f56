use engine::{GameEngine, ValidActions};

/// A two player race: player 1 wants the count to reach `MAX_COUNT`, player 2 wants it to reach 0.
#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct CountingGameState {
    pub p1_turn: bool,
    pub count: usize,
}

pub const MAX_COUNT: usize = 4;

impl CountingGameState {
    pub fn new(p1_turn: bool, count: usize) -> Self {
        Self { p1_turn, count }
    }

    pub fn initial() -> Self {
        Self::new(true, MAX_COUNT / 2)
    }

    pub fn is_terminal_state(&self) -> Option<Value> {
        if self.count >= MAX_COUNT {
            Some(Value([1.0, 0.0]))
        } else if self.count == 0 {
            Some(Value([0.0, 1.0]))
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct CountingGameEngine {}

impl CountingGameEngine {
    pub fn new() -> Self {
        Self {}
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Value(pub [f32; 2]);

impl engine::Value for Value {
    fn get_value_for_player(&self, player: usize) -> f32 {
        self.0[player - 1]
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum CountingAction {
    Increment,
    Decrement,
    Stay,
}

impl GameEngine for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;
    type Terminal = Value;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        let count = game_state.count;

        let new_count = match action {
            CountingAction::Increment => count + 1,
            CountingAction::Decrement => count - 1,
            CountingAction::Stay => count,
        };

        Self::State {
            p1_turn: !game_state.p1_turn,
            count: new_count,
        }
    }

    fn terminal_state(&self, game_state: &Self::State) -> Option<Self::Terminal> {
        game_state.is_terminal_state()
    }

    fn player_to_move(&self, game_state: &Self::State) -> usize {
        if game_state.p1_turn {
            1
        } else {
            2
        }
    }
}

impl ValidActions for CountingGameEngine {
    type State = CountingGameState;
    type Action = CountingAction;

    fn valid_actions(&self, game_state: &Self::State) -> impl Iterator<Item = Self::Action> {
        let actions = if game_state.is_terminal_state().is_some() {
            vec![]
        } else {
            vec![
                CountingAction::Increment,
                CountingAction::Decrement,
                CountingAction::Stay,
            ]
        };

        actions.into_iter()
    }
}
