//! List queries: equality filters, pagination and result pages.

use core::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Upper bound for a single page, whatever the caller asks for.
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Page size used when the caller does not pass `limit`.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// `limit`/`offset` window over an ordered result set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    /// Build a window from optional caller input.
    ///
    /// `limit = 0` is rejected; limits above [`MAX_PAGE_LIMIT`] are clamped.
    pub fn new(limit: Option<u32>, offset: Option<u32>, default_limit: u32) -> DomainResult<Self> {
        let limit = limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(DomainError::validation("limit must be greater than zero"));
        }
        Ok(Self {
            limit: limit.min(MAX_PAGE_LIMIT),
            offset: offset.unwrap_or(0),
        })
    }

    /// Index range selected from a result set of `total` rows.
    pub fn window(&self, total: usize) -> Range<usize> {
        let start = (self.offset as usize).min(total);
        let end = start.saturating_add(self.limit as usize).min(total);
        start..end
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One page of a list result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl<T> Page<T> {
    pub fn empty(pagination: Pagination) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// A list request against one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// Field → value equality constraints on the record body.
    pub filter: Map<String, Value>,
    pub pagination: Pagination,
    /// Soft-deleted rows are skipped unless this is set.
    pub include_deleted: bool,
}

impl ListQuery {
    pub fn new(filter: Map<String, Value>, pagination: Pagination) -> Self {
        Self {
            filter,
            pagination,
            include_deleted: false,
        }
    }
}

/// Turn a typed filter into an equality map, dropping unset (`null`) fields.
pub fn filter_map<F: Serialize>(filter: &F) -> DomainResult<Map<String, Value>> {
    match serde_json::to_value(filter) {
        Ok(Value::Object(map)) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(DomainError::validation(format!(
            "filter must be an object, got {other}"
        ))),
        Err(e) => Err(DomainError::validation(e.to_string())),
    }
}

/// True when every filter field is contained in `body`.
///
/// Same semantics as Postgres `jsonb @>`: scalars compare equal, an array
/// filter matches when each of its elements is contained in the body array.
pub fn matches_filter(body: &Value, filter: &Map<String, Value>) -> bool {
    let Some(obj) = body.as_object() else {
        return filter.is_empty();
    };
    filter
        .iter()
        .all(|(k, v)| obj.get(k).is_some_and(|field| contains(field, v)))
}

fn contains(value: &Value, wanted: &Value) -> bool {
    match (value, wanted) {
        (Value::Object(have), Value::Object(want)) => want
            .iter()
            .all(|(k, w)| have.get(k).is_some_and(|h| contains(h, w))),
        (Value::Array(have), Value::Array(want)) => {
            want.iter().all(|w| have.iter().any(|h| contains(h, w)))
        }
        _ => value == wanted,
    }
}
