//! Offset/limit pagination shared by song search and couplet listing

/// Maximum rows returned by a single page
pub const MAX_LIMIT: i64 = 100;

/// Rows returned when no usable limit is supplied
pub const DEFAULT_LIMIT: i64 = 5;

/// Clamped pagination window.
///
/// Construction always clamps, so a `Page` can be bound into SQL as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: i64,
    limit: i64,
}

impl Page {
    /// Create a page from raw (possibly missing or out-of-range) values.
    ///
    /// - Offset below 0 (or absent) becomes 0
    /// - Limit `<= 0` (or absent) becomes `DEFAULT_LIMIT`
    /// - Limit above `MAX_LIMIT` is capped to `MAX_LIMIT`
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> Self {
        let offset = offset.unwrap_or(0).max(0);
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };

        Self { offset, limit }
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}
