//! Pagination Normalizer
//!
//! `page` and `limit` come straight from the query string. Anything that does
//! not parse as an integer counts as absent, and the result is always inside
//! the endpoint's bounds. Normalization never fails.

/// Per-endpoint page size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl PaginationPolicy {
    pub const fn new(default_limit: u32, max_limit: u32) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }
}

/// A normalized page request: `page >= 1`, `1 <= limit <= max_limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn normalize(policy: PaginationPolicy, page: Option<&str>, limit: Option<&str>) -> Self {
        let max_limit = policy.max_limit.max(1);

        let page = parse_int(page).unwrap_or(1).clamp(1, i64::from(u32::MAX));
        let limit = parse_int(limit)
            .unwrap_or(i64::from(policy.default_limit))
            .clamp(1, i64::from(max_limit));

        Self {
            page: u32::try_from(page).unwrap_or(u32::MAX),
            limit: u32::try_from(limit).unwrap_or(max_limit),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}
