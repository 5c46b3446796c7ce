use std::path::{Path, PathBuf};

use crate::types::TypeError;
use thiserror::Error;

/// Error type for catalog access.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file not found at the specified path.
    #[error("catalog not found: {0}")]
    MissingCatalog(PathBuf),
    /// The SQLite back-end reported an error.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    /// A column held a value that could not be decoded.
    #[error("invalid catalog value: {0}")]
    InvalidValue(#[from] TypeError),
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub(crate) fn missing_catalog(path: impl AsRef<Path>) -> Self {
        CatalogError::MissingCatalog(path.as_ref().to_path_buf())
    }
}
