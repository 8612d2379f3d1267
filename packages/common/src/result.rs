use crate::error::BdocError;

/// Common Result type alias
pub type BdocResult<T> = Result<T, BdocError>;
