//! Store-level query values: predicate, sort and window.
//!
//! Field names are closed enums. Nothing a caller types can become a column
//! name or an operator.

use std::collections::BTreeMap;
use std::fmt;

use crate::{StoreError, StoreResult};

/// A field that may appear in a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    Title,
    Author,
    Genre,
    PublicationDate,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Title,
        FilterField::Author,
        FilterField::Genre,
        FilterField::PublicationDate,
    ];

    /// The request parameter and JSON key for this field.
    #[must_use]
    pub const fn param_name(self) -> &'static str {
        match self {
            FilterField::Title => "title",
            FilterField::Author => "author",
            FilterField::Genre => "genre",
            FilterField::PublicationDate => "publicationDate",
        }
    }

    #[must_use]
    pub fn from_param(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.param_name() == name)
    }

    /// Builds the matcher this field is bound to: text fields match by
    /// case-insensitive substring, the publication date by exact value.
    #[must_use]
    pub fn matcher(self, value: impl Into<String>) -> Matcher {
        match self {
            FilterField::Title | FilterField::Author | FilterField::Genre => {
                Matcher::Contains(value.into())
            }
            FilterField::PublicationDate => Matcher::Equals(value.into()),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param_name())
    }
}

/// How a single field is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Case-insensitive substring match.
    Contains(String),
    /// Exact match. The raw value is cast to the field's type by the store.
    Equals(String),
}

/// Per-field matchers combined with logical AND. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    matchers: BTreeMap<FilterField, Matcher>,
}

impl Predicate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the matcher for `field`.
    pub fn insert(&mut self, field: FilterField, matcher: Matcher) {
        self.matchers.insert(field, matcher);
    }

    #[must_use]
    pub fn with(mut self, field: FilterField, matcher: Matcher) -> Self {
        self.insert(field, matcher);
        self
    }

    #[must_use]
    pub fn get(&self, field: FilterField) -> Option<&Matcher> {
        self.matchers.get(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &Matcher)> {
        self.matchers.iter().map(|(f, m)| (*f, m))
    }
}

/// A field to order by. Unrecognized names are kept verbatim in `Other`
/// and do not affect ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Author,
    Genre,
    PublicationDate,
    CreatedAt,
    Other(String),
}

impl SortField {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "id" | "_id" => SortField::Id,
            "title" => SortField::Title,
            "author" => SortField::Author,
            "genre" => SortField::Genre,
            "publicationDate" => SortField::PublicationDate,
            "createdAt" => SortField::CreatedAt,
            other => SortField::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Genre => "genre",
            SortField::PublicationDate => "publicationDate",
            SortField::CreatedAt => "createdAt",
            SortField::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parses the direction vocabulary accepted by the store: `asc`,
    /// `ascending`, `1`, `desc`, `descending` and `-1` (case-insensitive).
    pub fn from_store_value(raw: &str) -> StoreResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortDirection::Ascending),
            "desc" | "descending" | "-1" => Ok(SortDirection::Descending),
            _ => Err(StoreError::InvalidQuery(format!(
                "invalid sort value: {raw:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    #[must_use]
    pub fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    #[must_use]
    pub fn descending(field: SortField) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// A contiguous slice of an ordered result set.
///
/// Values are kept exactly as computed: a non-positive `limit` selects
/// nothing and a negative `skip` is rejected by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: i64,
    pub limit: i64,
}

impl Window {
    #[must_use]
    pub const fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }

    /// Window for a 1-based page. Arithmetic saturates instead of wrapping.
    #[must_use]
    pub fn for_page(page: i64, page_size: i64) -> Self {
        Self {
            skip: page.saturating_sub(1).saturating_mul(page_size),
            limit: page_size,
        }
    }
}

/// A complete find: filter, then sort, then skip, then limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    pub predicate: Predicate,
    pub sort: Option<SortSpec>,
    pub window: Option<Window>,
}

impl FindQuery {
    /// Matches every book, in id order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filtered(predicate: Predicate) -> Self {
        Self {
            predicate,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn windowed(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }
}
