use thiserror::Error;

/// Error type shared by every bdoc crate
#[derive(Error, Debug)]
pub enum BdocError {
    /// Offset conversion argument outside `[0, len]`
    #[error("Offset {offset} out of range (length {len})")]
    OutOfRange { offset: usize, len: usize },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BdocError {
    pub fn not_found(what: impl Into<String>) -> Self {
        BdocError::NotFound(what.into())
    }

    pub fn invalid_command(why: impl Into<String>) -> Self {
        BdocError::InvalidCommand(why.into())
    }

    pub fn precondition(why: impl Into<String>) -> Self {
        BdocError::Precondition(why.into())
    }
}
