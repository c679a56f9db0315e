use std::sync::Arc;

use bookshelf_store::{DocumentStore, FindQuery, Predicate};
use bookshelf_types::{Book, NewBook};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::query::{CombinedQuery, Query};
use crate::CatalogResult;

/// One page of books plus the collection size.
///
/// `total_books` comes from a separate count and may not agree with `books`
/// if the collection changed between the two reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub books: Vec<Book>,
    pub total_books: u64,
}

/// Create and retrieve operations over the book collection.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn DocumentStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validates `body` and stores it. One write, no retry.
    pub async fn create(&self, body: &Value) -> CatalogResult<Book> {
        let draft = NewBook::from_json(body)?;
        let book = self.store.insert(draft).await?;
        info!("created book {}", book.id);
        Ok(book)
    }

    /// Every stored book, uncapped, in insertion order.
    pub async fn list_all(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.store.find(FindQuery::all()).await?)
    }

    /// Books matching every matcher of the query's predicate.
    pub async fn list_filtered(&self, query: &Query) -> CatalogResult<Vec<Book>> {
        debug!("filtering books by {:?}", query.predicate);
        Ok(self
            .store
            .find(FindQuery::filtered(query.predicate.clone()))
            .await?)
    }

    /// One unsorted window of the whole collection and the total count.
    pub async fn list_paginated(&self, query: &Query) -> CatalogResult<Page> {
        let window = query.pagination.window();
        debug!("paginating books with {:?}", window);
        let total_books = self.store.count(&Predicate::new()).await?;
        let books = self.store.find(FindQuery::all().windowed(window)).await?;
        Ok(Page { books, total_books })
    }

    /// The whole collection in the query's sort order, ties by id.
    pub async fn list_sorted(&self, query: &Query) -> CatalogResult<Vec<Book>> {
        debug!("sorting books by {:?}", query.sort);
        Ok(self
            .store
            .find(FindQuery::all().sorted(query.sort.clone()))
            .await?)
    }

    /// The combined path: `createdAt` order, then the page/limit window.
    pub async fn list_combined(&self, query: &CombinedQuery) -> CatalogResult<Vec<Book>> {
        debug!("listing books with {:?}", query);
        let find = FindQuery::all().sorted(query.sort()).windowed(query.window());
        Ok(self.store.find(find).await?)
    }
}
