use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("participant {0} already exists")]
    Conflict(String),

    #[error("no active participant named {0:?}")]
    NotFound(String),

    /// More than one row matched a name that should be unique.
    #[error("{matches} participants share the name {name:?}")]
    Ambiguous { name: String, matches: usize },

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl ChatError {
    /// Zero and multiple matches are one error class to callers.
    pub fn is_unresolved_identity(&self) -> bool {
        matches!(self, ChatError::NotFound(_) | ChatError::Ambiguous { .. })
    }
}
