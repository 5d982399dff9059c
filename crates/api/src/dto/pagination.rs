//! Paged response envelope.

use serde::Serialize;

use crate::models::Page;

/// One page of results with navigation totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PagedResponse<T> {
    /// Convert a domain page, mapping each item to its DTO.
    pub fn from_page<U>(page: Page<U>) -> Self
    where
        T: From<U>,
    {
        Self {
            page_number: page.request.page_number(),
            page_size: page.request.page_size(),
            total_count: page.total_count,
            total_pages: page.total_pages(),
            has_previous_page: page.has_previous_page(),
            has_next_page: page.has_next_page(),
            items: page.items.into_iter().map(T::from).collect(),
        }
    }
}
