pub mod action;
pub mod engine;
pub mod game_state;
pub mod value;

pub use action::*;
pub use self::engine::*;
pub use game_state::*;
pub use value::*;
