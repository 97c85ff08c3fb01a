use thiserror::Error;

/// Errors surfaced by manager operations.
///
/// Validation errors are raised before anything is written; store errors
/// come out of SQLite and are always retryable.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
