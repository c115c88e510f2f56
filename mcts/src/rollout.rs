use std::marker::PhantomData;

use engine::{GameEngine, ValidActions, Value};
use rand::Rng;

use crate::{MctsError, Result};

/// Picks the next action of a simulated playout.
pub trait RolloutPolicy {
    type State;
    type Action;

    /// Returns an index into `actions`, which is never empty.
    fn choose_action<R: Rng + ?Sized>(
        &self,
        game_state: &Self::State,
        actions: &[Self::Action],
        rng: &mut R,
    ) -> usize;
}

/// Uniformly random playouts.
pub struct RandomRollout<S, A> {
    _phantom: PhantomData<fn(&S) -> A>,
}

impl<S, A> RandomRollout<S, A> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<S, A> Default for RandomRollout<S, A> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<S, A> RolloutPolicy for RandomRollout<S, A> {
    type State = S;
    type Action = A;

    fn choose_action<R: Rng + ?Sized>(&self, _: &S, actions: &[A], rng: &mut R) -> usize {
        rng.gen_range(0..actions.len())
    }
}

/// The outcome of a finished game.
pub fn outcome<E, S>(game_engine: &E, game_state: &S) -> Result<E::Terminal>
where
    E: GameEngine<State = S>,
{
    game_engine.terminal_state(game_state).ok_or_else(|| {
        MctsError::Precondition("outcome requested for a non-terminal state".to_string())
    })
}

/// Plays from `game_state` to the end of the game on a copy of the state.
///
/// A terminal state is returned as is without applying any action.
pub fn simulate<E, S, A, P, R>(
    game_engine: &E,
    game_state: &S,
    rollout_policy: &P,
    rng: &mut R,
) -> Result<E::Terminal>
where
    S: Clone,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    P: RolloutPolicy<State = S, Action = A>,
    R: Rng + ?Sized,
{
    let mut game_state = game_state.clone();
    let mut actions = Vec::new();

    loop {
        if let Some(terminal) = game_engine.terminal_state(&game_state) {
            return Ok(terminal);
        }

        actions.clear();
        actions.extend(game_engine.valid_actions(&game_state));

        if actions.is_empty() {
            return Err(MctsError::Precondition(
                "non-terminal state has no legal actions".to_string(),
            ));
        }

        let index = rollout_policy.choose_action(&game_state, &actions, rng);
        let action = actions.get(index).ok_or_else(|| {
            MctsError::Precondition(format!(
                "rollout policy chose action {} of {}",
                index,
                actions.len()
            ))
        })?;

        game_state = game_engine.take_action(&game_state, action);
    }
}

/// Mean score for `player` over `samples` independent playouts.
pub fn expected_reward<E, S, A, P, R>(
    game_engine: &E,
    game_state: &S,
    player: usize,
    samples: usize,
    rollout_policy: &P,
    rng: &mut R,
) -> Result<f32>
where
    S: Clone,
    E: GameEngine<State = S, Action = A> + ValidActions<State = S, Action = A>,
    P: RolloutPolicy<State = S, Action = A>,
    R: Rng + ?Sized,
{
    if samples == 0 {
        return Err(MctsError::Precondition(
            "expected reward needs at least one sample".to_string(),
        ));
    }

    let mut score_sum = 0.0;
    for _ in 0..samples {
        let terminal = simulate(game_engine, game_state, rollout_policy, rng)?;
        score_sum += terminal.get_value_for_player(player);
    }

    Ok(score_sum / samples as f32)
}
