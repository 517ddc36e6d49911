use mania_model::ModelError;
use thiserror::Error;

/// Reasons a play session cannot be built or stepped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Invalid judgment windows: {reason}")]
    InvalidJudgmentWindows { reason: String },

    #[error("Expected {expected} key states, got {got}")]
    KeyCountMismatch { expected: usize, got: usize },
}
