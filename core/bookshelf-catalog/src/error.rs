//! Error types for the catalog service.

use bookshelf_store::StoreError;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors returned by [`crate::BookService`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The create payload was malformed.
    #[error(transparent)]
    Validation(#[from] bookshelf_types::Error),

    /// The store failed or refused to run the query.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Store,
}

impl CatalogError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) => ErrorKind::Validation,
            CatalogError::Store(_) => ErrorKind::Store,
        }
    }
}
