use thiserror::Error;

/// Errors surfaced by the search.
///
/// `Configuration` and `InvalidState` are raised before any search work begins. The
/// remaining variants indicate a broken game implementation and are never recovered from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MctsError {
    #[error("Invalid search configuration: {0}")]
    Configuration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("A child for action {0} already exists")]
    DuplicateMove(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("The root node has no children to select from")]
    EmptyTree,
}

pub type Result<T> = std::result::Result<T, MctsError>;
