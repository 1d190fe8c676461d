//! Errors surfaced to the user by the feed's actions.

use backend::BackendError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("A post needs some text.")]
    EmptyPost,
    #[error("A comment needs some text.")]
    EmptyComment,
    #[error("Please fill in every required field.")]
    IncompleteForm,
}

impl ApiError {
    /// Text for the blocking notice; platform errors carry their code.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Backend(err) => format!("{err} ({})", err.code()),
            other => other.to_string(),
        }
    }
}
