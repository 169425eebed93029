//! Paginated collection envelope returned by every list endpoint.

use serde::{Deserialize, Serialize};

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total number of items across all pages
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    /// Builds pagination metadata, deriving the page count from `total` and `limit`.
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

/// One page of a collection. Older endpoints name the array `items` instead of `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records on this page
    #[serde(alias = "items")]
    pub data: Vec<T>,
    /// Where this page sits in the whole collection
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// True when the page holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
