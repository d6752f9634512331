//! Page/limit -> skip/limit conversion.

use serde::{Deserialize, Serialize};

/// Page number used when the caller gives none.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the caller gives none.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest window value the store accepts; SQL offsets and limits are signed.
const MAX_WINDOW: u64 = i64::MAX as u64;

/// Offset window for a paginated query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Records to skip. Always `>= 0` and at most `i64::MAX`.
    pub skip: u64,
    /// Records to return. Always `>= 1`.
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        paginate(None, None)
    }
}

/// Convert a 1-based page number and page size to an offset window.
///
/// Missing values default to page 1 and limit 10; anything below 1 is clamped
/// up to 1. A skip past `i64::MAX` is clamped there. Never fails.
///
/// ```
/// use reelsync::pagination::{Page, paginate};
///
/// assert_eq!(paginate(Some(2), Some(5)), Page { skip: 5, limit: 5 });
/// assert_eq!(paginate(Some(-1), Some(-10)), Page { skip: 0, limit: 1 });
/// ```
pub fn paginate(page: Option<i64>, limit: Option<i64>) -> Page {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1) as u64;
    let limit = limit.unwrap_or(DEFAULT_LIMIT).max(1) as u64;

    Page {
        skip: (page - 1).saturating_mul(limit).min(MAX_WINDOW),
        limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_defaults() {
        assert_eq!(paginate(None, None), Page { skip: 0, limit: 10 });
        assert_eq!(Page::default(), Page { skip: 0, limit: 10 });
    }

    #[test]
    fn test_paginate_computes_skip() {
        assert_eq!(paginate(Some(2), Some(5)), Page { skip: 5, limit: 5 });
        assert_eq!(paginate(Some(1), Some(20)), Page { skip: 0, limit: 20 });
        assert_eq!(paginate(Some(4), None), Page { skip: 30, limit: 10 });
    }

    #[test]
    fn test_paginate_clamps_non_positive_values() {
        assert_eq!(paginate(Some(-1), Some(-10)), Page { skip: 0, limit: 1 });
        assert_eq!(paginate(Some(0), Some(0)), Page { skip: 0, limit: 1 });
        assert_eq!(paginate(Some(3), Some(0)), Page { skip: 2, limit: 1 });
    }

    #[test]
    fn test_paginate_clamps_skip_to_signed_range() {
        let page = paginate(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(page.skip, i64::MAX as u64);
        assert_eq!(page.limit, i64::MAX as u64);

        let page = paginate(Some(i64::MAX), Some(10));
        assert_eq!(page.skip, i64::MAX as u64);
        assert!(i64::try_from(page.skip).is_ok());
    }
}
