//! Paged collections.
//!
//! Octopus returns collections one page at a time:
//!
//! ```json
//! { "ItemType": "Machine", "TotalResults": 42, "ItemsPerPage": 30, "Items": [...], "Links": {...} }
//! ```
//!
//! The next page is requested with `?skip=N`. The server does not echo the
//! offset, so [`Page::skip`] is filled in by the client that fetched the page.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page<T> {
    /// Resource type name, e.g. `Machine`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Number of items across all pages
    pub total_results: usize,
    /// Server page size
    pub items_per_page: usize,
    /// Number of pages (newer servers only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<usize>,
    /// Zero-based index of the last page (newer servers only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_page_number: Option<usize>,
    /// Items in server order
    pub items: Vec<T>,
    /// Navigation links (`Self`, `Page.Next`, ...)
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub links: HashMap<String, String>,
    /// Offset this page was requested with
    #[serde(skip)]
    pub skip: usize,
}

impl<T> Page<T> {
    /// Record the offset this page was requested with.
    #[must_use]
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Cursor describing this page's position in the collection.
    #[must_use]
    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            skip: self.skip,
            items_on_page: self.items.len(),
            page_size: self.items_per_page,
            total_results: self.total_results,
        }
    }

    /// Offset of the next page, if any.
    #[must_use]
    pub fn skip_for_next_page(&self) -> Option<usize> {
        self.cursor().next_skip()
    }

    /// Offset of the previous page, if any.
    #[must_use]
    pub fn skip_for_previous_page(&self) -> Option<usize> {
        self.cursor().previous_skip()
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if this page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Position of a page within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// Offset the page was requested with
    pub skip: usize,
    /// Items actually returned on the page
    pub items_on_page: usize,
    /// Server page size
    pub page_size: usize,
    /// Items across all pages
    pub total_results: usize,
}

impl PageCursor {
    /// Returns true if items remain after this page.
    ///
    /// An empty page never has a successor, otherwise a server reporting more
    /// results than it returns would be polled forever.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next_skip().is_some()
    }

    /// Offset of the next page. An offset that would overflow ends iteration.
    #[must_use]
    pub const fn next_skip(&self) -> Option<usize> {
        if self.items_on_page == 0 {
            return None;
        }
        match self.skip.checked_add(self.items_on_page) {
            Some(next) if next < self.total_results => Some(next),
            _ => None,
        }
    }

    /// Returns true if this is not the first page.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.skip > 0
    }

    /// Offset of the previous page, clamped at zero.
    #[must_use]
    pub const fn previous_skip(&self) -> Option<usize> {
        if self.has_previous() {
            Some(self.skip.saturating_sub(self.page_size))
        } else {
            None
        }
    }
}
