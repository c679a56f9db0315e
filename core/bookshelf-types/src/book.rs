use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{date, BookId, Error, Result};

/// A book record as held by the store.
///
/// `id` and `created_at` are assigned by the store on insert; everything else
/// comes from the create payload and may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "date::wire::option"
    )]
    pub publication_date: Option<DateTime<Utc>>,
    #[serde(with = "date::wire")]
    pub created_at: DateTime<Utc>,
}

/// The validated fields of a book that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
}

impl NewBook {
    /// Shorthand for a book with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Validates an untyped request body.
    ///
    /// The body must be a JSON object. Unknown keys are dropped, including
    /// any caller-supplied `id` or `createdAt`. `null` means absent.
    pub fn from_json(body: &Value) -> Result<Self> {
        let Value::Object(map) = body else {
            return Err(Error::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_kind(body)
            )));
        };

        Ok(Self {
            title: text_field(map, "title")?,
            author: text_field(map, "author")?,
            genre: text_field(map, "genre")?,
            publication_date: date_field(map, "publicationDate")?,
        })
    }

    /// Turns the draft into a stored record.
    #[must_use]
    pub fn into_book(self, id: BookId, created_at: DateTime<Utc>) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            publication_date: self.publication_date,
            created_at,
        }
    }
}

// Scalars are coerced to their string form; containers are rejected.
fn text_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<String>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(Error::InvalidField {
            field,
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
    }
}

fn date_field(map: &Map<String, Value>, field: &'static str) -> Result<Option<DateTime<Utc>>> {
    let parsed = match map.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => date::parse_date(s),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(millis) => date::from_millis(millis),
            None => Err(Error::InvalidDate(n.to_string())),
        },
        Some(other) => Err(Error::InvalidDate(format!("a JSON {}", json_kind(other)))),
    };
    parsed.map(Some).map_err(|e| Error::InvalidField {
        field,
        reason: e.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
