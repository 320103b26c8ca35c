//! Pagination module for page-windowed listings
//!
//! This module provides the page request clamping rules, the page result
//! type computed from an ordered source, and the metadata carried in the
//! `X-Pagination` response header.

use serde::{Deserialize, Serialize};

/// Name of the response header carrying pagination metadata (`X-Pagination`),
/// lowercased as HTTP header names are case-insensitive
pub const PAGINATION_HEADER: &str = "x-pagination";

/// Raw page query parameters as received from a client
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page number (1-based)
    pub page_number: Option<i64>,
    /// Number of items per page
    pub page_size: Option<i64>,
}

impl PageRequest {
    /// Resolve to a usable `(page_number, page_size)` pair
    ///
    /// A missing page number means 1 and a missing size means
    /// `default_size`; the number is raised to at least 1 and the size is
    /// forced into `[1, max_size]`.
    pub fn clamped(&self, default_size: usize, max_size: usize) -> (usize, usize) {
        let page = self.page_number.unwrap_or(1).max(1) as usize;
        let size = match self.page_size {
            Some(size) if size < 1 => 1,
            Some(size) => (size as u64).min(max_size as u64) as usize,
            None => default_size,
        };
        (page, size.clamp(1, max_size.max(1)))
    }
}

/// One page of an ordered collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageList<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page_size: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl<T> PageList<T> {
    /// Take the window `[(page - 1) * size, page * size)` out of `source`
    ///
    /// `total_count` must be the number of items `source` yields. Pages past
    /// the end are empty but still report the real totals.
    pub fn from_window<I>(source: I, total_count: usize, current_page: usize, page_size: usize) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let page_size = page_size.max(1);
        let current_page = current_page.max(1);
        let skip = (current_page - 1).saturating_mul(page_size);
        let items = source.into_iter().skip(skip).take(page_size).collect();

        Self {
            items,
            total_count,
            page_size,
            current_page,
            total_pages: total_count.div_ceil(page_size),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Convert the items while keeping the page window
    pub fn map<U, F>(self, f: F) -> PageList<U>
    where
        F: FnMut(T) -> U,
    {
        PageList {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_size: self.page_size,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

/// Metadata serialized into the `X-Pagination` header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHeader {
    pub previous_page_link: Option<String>,
    pub next_page_link: Option<String>,
    pub total_count: usize,
    pub page_size: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl PaginationHeader {
    /// Build the header for a page, asking `link` for the URL of a page number
    pub fn for_page<T, F>(page: &PageList<T>, mut link: F) -> Self
    where
        F: FnMut(usize, usize) -> String,
    {
        let previous_page_link = page
            .has_previous()
            .then(|| link(page.current_page - 1, page.page_size));
        let next_page_link = page
            .has_next()
            .then(|| link(page.current_page + 1, page.page_size));

        Self {
            previous_page_link,
            next_page_link,
            total_count: page.total_count,
            page_size: page.page_size,
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }
}
