//! Offset-based pagination types.
//!
//! A page is a bounded slice of a collection plus navigation hints. The hints
//! are pure offset arithmetic: `next` is always `offset + limit` whether or
//! not more rows exist, and `previous` is `offset - limit` whenever the
//! caller was not already at the start. Neither hint is checked against a
//! total count.

use serde::Serialize;

/// Configured bounds for page sizes.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    /// Limit applied when the caller does not send one.
    pub default_limit: u32,
    /// Upper bound; requested limits above this are clamped down.
    pub max_limit: u32,
}

impl PageLimits {
    /// Resolve a requested limit against these bounds.
    ///
    /// A missing limit falls back to the default; anything else is clamped
    /// into `[1, max_limit]`.
    #[must_use]
    pub fn resolve(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Pagination metadata returned alongside a slice of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Effective (clamped) page size.
    pub limit: u32,
    /// Offset for the following page. Always present; the caller may find
    /// it points past the end of the collection.
    pub next: i64,
    /// Offset for the preceding page. Absent when the request started at
    /// offset 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<i64>,
}

impl Page {
    /// Build navigation hints for a request at `offset` with `limit`.
    #[must_use]
    pub fn from_offsets(limit: u32, offset: u32) -> Self {
        let previous = if offset > 0 {
            Some(i64::from(offset) - i64::from(limit))
        } else {
            None
        };

        Self {
            limit,
            next: i64::from(offset) + i64::from(limit),
            previous,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_has_no_previous() {
        let page = Page::from_offsets(10, 0);
        assert_eq!(page.limit, 10);
        assert_eq!(page.next, 10);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_interior_page_offsets() {
        let page = Page::from_offsets(10, 20);
        assert_eq!(page.next, 30);
        assert_eq!(page.previous, Some(10));
    }

    #[test]
    fn test_previous_is_exact_arithmetic_even_below_zero() {
        // offset < limit still reports offset - limit; clients treat any
        // negative previous as "go back to the start".
        let page = Page::from_offsets(10, 5);
        assert_eq!(page.previous, Some(-5));
        assert_eq!(page.next, 15);
    }

    #[test]
    fn test_previous_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(Page::from_offsets(10, 0)).unwrap();
        assert_eq!(json, serde_json::json!({"limit": 10, "next": 10}));
    }

    #[test]
    fn test_resolve_clamps_to_configured_bounds() {
        let limits = PageLimits {
            default_limit: 10,
            max_limit: 100,
        };
        assert_eq!(limits.resolve(None), 10);
        assert_eq!(limits.resolve(Some(0)), 1);
        assert_eq!(limits.resolve(Some(50)), 50);
        assert_eq!(limits.resolve(Some(1000)), 100);
    }
}
