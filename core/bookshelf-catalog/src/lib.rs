//! Book catalog service.
//!
//! [`query`] turns raw request parameters into store queries, and
//! [`BookService`] runs them against an injected
//! [`DocumentStore`](bookshelf_store::DocumentStore).
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookshelf_catalog::{query, BookService};
//! use bookshelf_store::SqliteStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::open_in_memory()?);
//! let service = BookService::new(store);
//!
//! let params = query::QueryParams::from([("author".to_string(), "tolkien".to_string())]);
//! let books = service.list_filtered(&query::build_query(&params)).await?;
//! # let _ = books;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod query;
mod service;

pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use query::{CombinedQuery, Pagination, Query, QueryParams};
pub use service::{BookService, Page};
