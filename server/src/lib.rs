//! HTTP API for the Bookshelf catalog.
//!
//! Routes:
//! - `POST /books` creates a book (201, or 400 on a malformed body)
//! - `GET /books` lists with the combined page/limit/createdAt convention
//! - `GET /books/filter` filters by title, author, genre, publicationDate
//! - `GET /books/paginate` returns `{books, totalBooks}` for page/pageSize
//! - `GET /books/sort` orders by `sort`/`order`
//!
//! Every error body is `{"message": "..."}`.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use bookshelf_catalog::{query, BookService, CatalogError, ErrorKind, Page, QueryParams};
use bookshelf_types::Book;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// JSON body of every error response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}

/// An error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match err.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Store => {
                warn!("store error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { message: self.message })).into_response()
    }
}

async fn create_book(
    State(service): State<BookService>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let book = service.create(&body).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(
    State(service): State<BookService>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let combined = query::build_combined(&params)?;
    Ok(Json(service.list_combined(&combined).await?))
}

async fn filter_books(
    State(service): State<BookService>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(service.list_filtered(&query::build_query(&params)).await?))
}

async fn paginate_books(
    State(service): State<BookService>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Page>, ApiError> {
    Ok(Json(service.list_paginated(&query::build_query(&params)).await?))
}

async fn sort_books(
    State(service): State<BookService>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(service.list_sorted(&query::build_query(&params)).await?))
}

/// Build the HTTP API router around the given service.
///
/// `GET /books` answers with the combined listing; an unbounded list-all is
/// only available through [`BookService::list_all`].
pub fn build_router(service: BookService) -> Router {
    Router::new()
        .route("/books", post(create_book).get(list_books))
        .route("/books/filter", get(filter_books))
        .route("/books/paginate", get(paginate_books))
        .route("/books/sort", get(sort_books))
        .with_state(service)
}
