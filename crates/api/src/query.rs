//! Shared query parameter types for API handlers.

use confdesk_core::paging::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::Deserialize;

/// A clamped `limit` / `offset` window for listing endpoints.
///
/// Listing filters carry the raw `?limit=&offset=` values next to their
/// own fields; handlers pass them through [`Page::clamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn clamp(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            offset: clamp_offset(offset),
        }
    }
}

/// `?include_inactive=true`, honoured for admins only.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_when_absent() {
        assert_eq!(
            Page::clamp(None, None),
            Page {
                limit: DEFAULT_PAGE_LIMIT,
                offset: 0
            }
        );
    }

    #[test]
    fn page_caps_limit_and_floors_offset() {
        let page = Page::clamp(Some(10_000), Some(-5));
        assert_eq!(page.limit, MAX_PAGE_LIMIT);
        assert_eq!(page.offset, 0);
    }
}
