//! Paginated list envelope.

use serde::{Deserialize, Serialize};

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// 1-based index of this page.
    #[serde(default = "first_page")]
    pub current_page: u32,
    /// Index of the last page.
    #[serde(default = "first_page")]
    pub last_page: u32,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total: u64,
}

const fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    /// An empty first page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            current_page: 1,
            last_page: 1,
            total: 0,
        }
    }

    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
