use crate::catalog::CatalogError;
use thiserror::Error;

/// Error type for history selection.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The catalog query failed; fatal for the instance being read.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
