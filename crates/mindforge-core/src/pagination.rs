//! Lenient page/pageSize parsing for admin listings.

use serde::Serialize;

use crate::defaults;

/// A parsed page request. Always valid: garbage input falls back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: defaults::PAGE,
            page_size: defaults::PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Parse raw query values. Non-numeric or non-positive values use the
    /// defaults; `page_size` is capped at [`defaults::PAGE_SIZE_MAX`].
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(defaults::PAGE);
        let page_size = parse_positive(page_size)
            .unwrap_or(defaults::PAGE_SIZE)
            .min(defaults::PAGE_SIZE_MAX);
        Self { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n > 0)
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, req: PageRequest) -> Self {
        Self {
            data,
            total,
            page: req.page,
            page_size: req.page_size,
        }
    }
}
