//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Filtered lists add the
//! size of the unfiltered collection.

use serde::Serialize;

use schoolhub_core::filter::ListPage;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [...], "total": n, "filtered": m }` for searchable lists.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub data: Vec<T>,
    /// Size of the list before filtering.
    pub total: usize,
    /// Number of items in `data`.
    pub filtered: usize,
}

impl<T: Serialize> From<ListPage<T>> for ListResponse<T> {
    fn from(page: ListPage<T>) -> Self {
        Self {
            data: page.items,
            total: page.total,
            filtered: page.matched,
        }
    }
}

impl<T: Serialize> ListResponse<T> {
    /// Convert each item, keeping the counts.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> ListResponse<U> {
        ListResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            filtered: self.filtered,
        }
    }
}
