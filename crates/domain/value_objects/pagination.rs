use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("limit must be at least 1")]
    InvalidLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Missing values take the defaults; limits above the cap are clamped.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, PageError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(PageError::InvalidPage);
        }
        if limit < 1 {
            return Err(PageError::InvalidLimit);
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub total_pages: i64,
    pub total_docs: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total_docs: i64) -> Self {
        let total_pages = if total_docs == 0 {
            0
        } else {
            (total_docs + request.limit - 1) / request.limit
        };

        Self {
            page: request.page,
            total_pages,
            total_docs,
            limit: request.limit,
        }
    }
}

/// Slices an already sorted in-memory set.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> (Vec<T>, Pagination) {
    let total_docs = items.len() as i64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit).unwrap_or(usize::MAX);

    let page_items = items.into_iter().skip(offset).take(limit).collect();

    (page_items, Pagination::new(request, total_docs))
}
