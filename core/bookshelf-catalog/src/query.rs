//! Turns raw request parameters into store queries.
//!
//! Two conventions coexist:
//!
//! - The dedicated paths (`build_filter`, `build_sort`, `build_pagination`)
//!   read `title`/`author`/`genre`/`publicationDate`, `sort`/`order` and
//!   `page`/`pageSize`. Numbers are parsed leniently and fall back to
//!   defaults.
//! - The combined path (`build_combined`) reads `page`/`limit` and a raw
//!   `sort` direction. It always sorts on `createdAt`, never filters, and
//!   rejects values it cannot parse.
//!
//! An empty parameter value counts as absent on both paths.

use std::collections::HashMap;

use bookshelf_store::{
    FilterField, Predicate, SortDirection, SortField, SortSpec, StoreError, Window,
};

use crate::{CatalogError, CatalogResult};

/// Raw query-string parameters.
pub type QueryParams = HashMap<String, String>;

pub const DEFAULT_SORT_FIELD: &str = "title";
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 2;
pub const DEFAULT_COMBINED_LIMIT: i64 = 10;

/// A 1-based page request. Values are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// `skip = (page - 1) * page_size`, `limit = page_size`.
    #[must_use]
    pub fn window(&self) -> Window {
        Window::for_page(self.page, self.page_size)
    }
}

/// Everything the dedicated filter, sort and paginate paths need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub predicate: Predicate,
    pub sort: SortSpec,
    pub pagination: Pagination,
}

/// The combined path's query: no filter, `createdAt` order, page/limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedQuery {
    pub page: i64,
    pub limit: i64,
    pub direction: SortDirection,
}

impl Default for CombinedQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_COMBINED_LIMIT,
            direction: SortDirection::Ascending,
        }
    }
}

impl CombinedQuery {
    #[must_use]
    pub fn sort(&self) -> SortSpec {
        SortSpec::new(SortField::CreatedAt, self.direction)
    }

    #[must_use]
    pub fn window(&self) -> Window {
        Window::for_page(self.page, self.limit)
    }
}

fn param<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

/// Builds the predicate from whitelisted fields only. Absent fields are left
/// out entirely.
#[must_use]
pub fn build_filter(params: &QueryParams) -> Predicate {
    let mut predicate = Predicate::new();
    for field in FilterField::ALL {
        if let Some(value) = param(params, field.param_name()) {
            predicate.insert(field, field.matcher(value));
        }
    }
    predicate
}

/// `sort` names the field (default `title`); the order is descending only
/// for `order=desc`.
#[must_use]
pub fn build_sort(params: &QueryParams) -> SortSpec {
    let field = SortField::from_name(param(params, "sort").unwrap_or(DEFAULT_SORT_FIELD));
    let direction = match param(params, "order") {
        Some("desc") => SortDirection::Descending,
        _ => SortDirection::Ascending,
    };
    SortSpec::new(field, direction)
}

/// `page` and `pageSize` with defaults for missing or unparseable values.
/// Zero and negative numbers are kept.
#[must_use]
pub fn build_pagination(params: &QueryParams) -> Pagination {
    Pagination {
        page: param(params, "page")
            .and_then(parse_int_prefix)
            .unwrap_or(DEFAULT_PAGE),
        page_size: param(params, "pageSize")
            .and_then(parse_int_prefix)
            .unwrap_or(DEFAULT_PAGE_SIZE),
    }
}

#[must_use]
pub fn build_query(params: &QueryParams) -> Query {
    Query {
        predicate: build_filter(params),
        sort: build_sort(params),
        pagination: build_pagination(params),
    }
}

/// Builds the combined path's query. The `filter` parameter is not read.
pub fn build_combined(params: &QueryParams) -> CatalogResult<CombinedQuery> {
    let page = strict_int(params, "page")?.unwrap_or(DEFAULT_PAGE);
    let limit = strict_int(params, "limit")?.unwrap_or(DEFAULT_COMBINED_LIMIT);
    let direction = match param(params, "sort") {
        Some(raw) => SortDirection::from_store_value(raw)?,
        None => SortDirection::Ascending,
    };
    Ok(CombinedQuery {
        page,
        limit,
        direction,
    })
}

fn strict_int(params: &QueryParams, key: &str) -> CatalogResult<Option<i64>> {
    param(params, key)
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                CatalogError::from(StoreError::InvalidQuery(format!(
                    "{key} must be an integer, got {raw:?}"
                )))
            })
        })
        .transpose()
}

/// Reads a leading integer the way `parseInt` does: leading whitespace, an
/// optional sign, then digits. Anything after the digits is ignored.
#[must_use]
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
