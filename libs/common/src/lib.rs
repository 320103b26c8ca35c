//! Common library for the users service
//!
//! This crate provides shared functionality used by the service, including
//! configuration loading, error types, and pagination primitives.

pub mod config;
pub mod error;
pub mod pagination;

/// Example usage of the pagination module
///
/// ```rust
/// use common::pagination::{PageList, PageRequest};
///
/// let request = PageRequest { page_number: Some(2), page_size: Some(50) };
/// let (page, size) = request.clamped(10, 20);
/// let list = PageList::from_window(0..45, 45, page, size);
/// assert_eq!(list.items.len(), 20);
/// assert!(list.has_next());
/// ```
pub fn example_usage() {}
