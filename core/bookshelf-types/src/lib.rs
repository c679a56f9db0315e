//! Core type definitions for the Bookshelf catalog.
//!
//! This crate defines the record types shared by the store, the catalog
//! service and the HTTP layer:
//! - [`BookId`], a store-assigned UUID v7 identifier
//! - [`Book`], a stored catalog record
//! - [`NewBook`], a validated create payload built from an untyped JSON body
//!
//! Dates are UTC instants; see [`date`] for the accepted input forms.

mod book;
pub mod date;
mod ids;

pub use book::{Book, NewBook};
pub use ids::BookId;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating book payloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid value for field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),
}
