//! Monte Carlo tree search with random rollouts.
//!
//! Any game implementing [`engine::GameEngine`] and [`engine::ValidActions`] can be searched.
//! Terminal values are scored per player in `[0, 1]`, and every node stores its reward from
//! the perspective of the player who moved into it.

pub mod backpropagation;
mod cancel;
#[cfg(test)]
mod counting_game;
mod error;
pub mod mcts;
mod node;
pub mod node_details;
pub mod options;
mod parallel;
pub mod rollout;
pub mod selection_strategy;
mod tree;
pub mod uct;

pub use cancel::*;
pub use error::*;
pub use mcts::*;
pub use node::*;
pub use node_details::*;
pub use options::*;
pub use rollout::*;
pub use selection_strategy::*;
pub use tree::*;
pub use uct::*;
