/// Pagination parameters and paged results

use serde::Serialize;

/// Page size used when the caller gives none or an out-of-range one
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page a caller may request
pub const MAX_LIMIT: i64 = 100;

/// Limit/offset window applied to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Normalizes raw values: limit outside 1..=100 becomes 10, negative offset becomes 0
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if (1..=MAX_LIMIT).contains(&l) => l,
            _ => DEFAULT_LIMIT,
        };
        let offset = offset.filter(|o| *o >= 0).unwrap_or(0);

        Self { limit, offset }
    }

    /// Parses query-string values leniently; anything unparseable falls back to the defaults
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self::new(
            limit.and_then(|l| l.trim().parse().ok()),
            offset.and_then(|o| o.trim().parse().ok()),
        )
    }
}

/// One page of a listing plus the window that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,

    /// Number of matching records across all pages
    pub total: i64,

    pub limit: i64,

    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            data,
            total,
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }
}
