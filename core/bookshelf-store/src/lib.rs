//! Document store adapter for the Bookshelf catalog.
//!
//! [`DocumentStore`] is the seam between the catalog service and
//! persistence. It offers three operations: insert, predicate-based find
//! (with optional sort, skip and limit applied in that order) and count.
//!
//! [`SqliteStore`] is the shipped implementation. Books live in a single
//! SQLite table; blocking calls are moved off the async scheduler with
//! `spawn_blocking`.

mod error;
mod query;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use query::{
    FilterField, FindQuery, Matcher, Predicate, SortDirection, SortField, SortSpec, Window,
};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use bookshelf_types::{Book, NewBook};

/// Persistence for book records.
///
/// Errors are returned as-is; implementations do not retry.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new book, assigning its `id` and `created_at`.
    async fn insert(&self, book: NewBook) -> StoreResult<Book>;

    /// Runs a find. Results without an explicit sort come back in id order.
    async fn find(&self, query: FindQuery) -> StoreResult<Vec<Book>>;

    /// Counts books matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> StoreResult<u64>;
}
