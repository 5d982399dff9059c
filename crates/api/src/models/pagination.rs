//! Page requests and paged results.
//!
//! Page numbers are 1-based. Sizes are clamped rather than rejected, and a
//! page past the end yields an empty item list with the real totals.

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller can get.
pub const MAX_PAGE_SIZE: u32 = 50;

/// A normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request from raw query values.
    ///
    /// - missing or non-positive `page_number` becomes 1
    /// - missing or non-positive `page_size` becomes [`DEFAULT_PAGE_SIZE`]
    /// - `page_size` above [`MAX_PAGE_SIZE`] is clamped to it
    #[must_use]
    pub fn new(page_number: Option<i64>, page_size: Option<i64>) -> Self {
        let page_number = page_number
            .filter(|n| *n >= 1)
            .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX));

        let page_size = match page_size {
            Some(size) if size >= 1 => {
                u32::try_from(size.min(i64::from(MAX_PAGE_SIZE))).unwrap_or(MAX_PAGE_SIZE)
            }
            _ => DEFAULT_PAGE_SIZE,
        };

        Self {
            page_number,
            page_size,
        }
    }

    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// SQL `LIMIT` value.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL `OFFSET` value.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page_number - 1) * i64::from(self.page_size)
    }

    /// Whether this page starts past `total_count` rows.
    #[must_use]
    pub fn is_beyond(&self, total_count: i64) -> bool {
        self.offset() >= total_count
    }
}

/// One page of results plus the totals needed to navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total_count: i64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total_count: i64) -> Self {
        Self {
            items,
            request,
            total_count,
        }
    }

    /// An empty page that still reports the real total.
    #[must_use]
    pub const fn empty(request: PageRequest, total_count: i64) -> Self {
        Self::new(Vec::new(), request, total_count)
    }

    #[must_use]
    pub fn total_pages(&self) -> i64 {
        if self.total_count <= 0 {
            return 0;
        }
        let size = i64::from(self.request.page_size());
        (self.total_count + size - 1) / size
    }

    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.request.page_number() > 1
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        i64::from(self.request.page_number()) < self.total_pages()
    }
}
