//! SQLite-backed [`DocumentStore`].

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bookshelf_types::{date, Book, BookId, NewBook};
use chrono::{Datelike, SubsecRound, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};
use tracing::debug;

use crate::{
    DocumentStore, FilterField, FindQuery, Matcher, Predicate, SortDirection, SortField,
    StoreError, StoreResult, Window,
};

const BOOK_COLUMNS: &str = "id, title, author, genre, publication_date, created_at";

/// Book store backed by a single SQLite connection.
///
/// Cloning is cheap and shares the connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!("opened book store at {}", path.display());
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        register_functions(&conn)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))?;
            op(&*guard)
        })
        .await?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        if let Some(d) = book
            .publication_date
            .filter(|d| !(0..=9999).contains(&d.year()))
        {
            return Err(StoreError::InvalidData(format!(
                "publication date {d} is outside years 0000-9999"
            )));
        }
        let mut book = book;
        // Stored timestamps carry millisecond precision; truncate up front so
        // the returned record equals what a later read yields.
        book.publication_date = book.publication_date.map(|d| d.trunc_subsecs(3));
        let book = book.into_book(BookId::new(), Utc::now().trunc_subsecs(3));

        self.with_conn(move |conn| {
            conn.execute(
                &format!("INSERT INTO books ({BOOK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    book.id.to_string(),
                    book.title,
                    book.author,
                    book.genre,
                    book.publication_date.as_ref().map(date::format_date),
                    date::format_date(&book.created_at),
                ],
            )?;
            Ok(book)
        })
        .await
    }

    async fn find(&self, query: FindQuery) -> StoreResult<Vec<Book>> {
        let (where_sql, mut values) = where_clause(&query.predicate)?;
        let window = match query.window {
            Some(window) if window.skip < 0 => {
                return Err(StoreError::InvalidQuery(format!(
                    "skip must be non-negative, got {}",
                    window.skip
                )));
            }
            Some(window) if window.limit <= 0 => return Ok(Vec::new()),
            other => other,
        };

        let mut sql = format!("SELECT {BOOK_COLUMNS} FROM books{where_sql}");
        sql.push_str(&order_clause(query.sort.as_ref().map(|s| (&s.field, s.direction))));
        if let Some(Window { skip, limit }) = window {
            sql.push_str(&format!(" LIMIT ?{} OFFSET ?{}", values.len() + 1, values.len() + 2));
            values.push(SqlValue::Integer(limit));
            values.push(SqlValue::Integer(skip));
        }

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), |row| {
                Ok(RawBook {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    author: row.get(2)?,
                    genre: row.get(3)?,
                    publication_date: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;

            let mut books = Vec::new();
            for row in rows {
                books.push(row?.decode()?);
            }
            Ok(books)
        })
        .await
    }

    async fn count(&self, predicate: &Predicate) -> StoreResult<u64> {
        let (where_sql, values) = where_clause(predicate)?;
        let sql = format!("SELECT COUNT(*) FROM books{where_sql}");
        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(&sql, params_from_iter(values), |row| row.get(0))?;
            u64::try_from(count).map_err(|_| StoreError::InvalidData(format!("negative count {count}")))
        })
        .await
    }
}

fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT,
            author TEXT,
            genre TEXT,
            publication_date TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_books_created_at ON books (created_at);
        ",
    )?;
    Ok(())
}

/// Registers `contains_ci(haystack, needle)`. SQLite's own `LIKE` and
/// `lower()` only fold ASCII.
fn register_functions(conn: &Connection) -> StoreResult<()> {
    conn.create_scalar_function(
        "contains_ci",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack: Option<String> = ctx.get(0)?;
            let needle: String = ctx.get(1)?;
            Ok(haystack
                .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false))
        },
    )?;
    Ok(())
}

fn filter_column(field: FilterField) -> &'static str {
    match field {
        FilterField::Title => "title",
        FilterField::Author => "author",
        FilterField::Genre => "genre",
        FilterField::PublicationDate => "publication_date",
    }
}

fn sort_column(field: &SortField) -> Option<&'static str> {
    match field {
        SortField::Id => Some("id"),
        SortField::Title => Some("title"),
        SortField::Author => Some("author"),
        SortField::Genre => Some("genre"),
        SortField::PublicationDate => Some("publication_date"),
        SortField::CreatedAt => Some("created_at"),
        SortField::Other(_) => None,
    }
}

fn where_clause(predicate: &Predicate) -> StoreResult<(String, Vec<SqlValue>)> {
    if predicate.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut terms = Vec::with_capacity(predicate.len());
    let mut values = Vec::with_capacity(predicate.len());
    for (field, matcher) in predicate.iter() {
        let column = filter_column(field);
        let n = values.len() + 1;
        match (field, matcher) {
            (FilterField::PublicationDate, Matcher::Contains(_)) => {
                return Err(StoreError::InvalidQuery(format!(
                    "substring match is not supported on {field}"
                )));
            }
            (FilterField::PublicationDate, Matcher::Equals(raw)) => {
                let ts = date::parse_date(raw).map_err(|_| {
                    StoreError::InvalidQuery(format!(
                        "cast to date failed for value {raw:?} at path {field}"
                    ))
                })?;
                terms.push(format!("{column} = ?{n}"));
                values.push(SqlValue::Text(date::format_date(&ts)));
            }
            (_, Matcher::Contains(needle)) => {
                terms.push(format!("contains_ci({column}, ?{n})"));
                values.push(SqlValue::Text(needle.clone()));
            }
            (_, Matcher::Equals(value)) => {
                terms.push(format!("{column} = ?{n}"));
                values.push(SqlValue::Text(value.clone()));
            }
        }
    }
    Ok((format!(" WHERE {}", terms.join(" AND ")), values))
}

// `id` always closes the ordering so equal sort keys come back in insertion
// order.
fn order_clause(sort: Option<(&SortField, SortDirection)>) -> String {
    match sort.and_then(|(field, dir)| sort_column(field).map(|col| (col, dir))) {
        Some(("id", SortDirection::Descending)) => " ORDER BY id DESC".to_string(),
        Some(("id", SortDirection::Ascending)) | None => " ORDER BY id ASC".to_string(),
        Some((column, SortDirection::Ascending)) => format!(" ORDER BY {column} ASC, id ASC"),
        Some((column, SortDirection::Descending)) => format!(" ORDER BY {column} DESC, id ASC"),
    }
}

struct RawBook {
    id: String,
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    publication_date: Option<String>,
    created_at: String,
}

impl RawBook {
    fn decode(self) -> StoreResult<Book> {
        let id = BookId::parse(&self.id)
            .map_err(|e| StoreError::InvalidData(format!("invalid id {:?}: {e}", self.id)))?;
        let publication_date = self
            .publication_date
            .map(|raw| date::parse_date(&raw))
            .transpose()
            .map_err(|e| StoreError::InvalidData(format!("book {id}: {e}")))?;
        let created_at = date::parse_date(&self.created_at)
            .map_err(|e| StoreError::InvalidData(format!("book {id}: {e}")))?;

        Ok(Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            publication_date,
            created_at,
        })
    }
}
