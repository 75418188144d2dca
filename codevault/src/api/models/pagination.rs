//! Shared pagination types for API query parameters.
//!
//! List endpoints use offset-based pagination with `skip` and `limit` parameters.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default number of items to return per page.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum number of items that can be requested per page.
pub const MAX_LIMIT: i64 = 100;

/// `skip` and `limit` as sent by the client. Query strings carry them as text, so they are
/// parsed with `DisplayFromStr` to work under `#[serde(flatten)]`.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// Number of items to skip (default: 0)
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,

    /// Maximum number of items to return (default: 10, max: 100)
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

/// The page actually served: negative offsets become 0 and the limit lands in 1..=MAX_LIMIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl From<&Pagination> for Page {
    fn from(requested: &Pagination) -> Self {
        Self {
            skip: requested.skip.map_or(0, |skip| skip.max(0)),
            limit: requested.limit.map_or(DEFAULT_LIMIT, |limit| limit.clamp(1, MAX_LIMIT)),
        }
    }
}

/// Paginated response wrapper for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T: ToSchema> {
    /// The items for the current page
    pub data: Vec<T>,
    /// Total number of items matching the query (before pagination)
    pub total_count: i64,
    /// Number of items skipped
    pub skip: i64,
    /// Maximum items returned per page
    pub limit: i64,
}

impl<T: ToSchema> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total_count: i64, skip: i64, limit: i64) -> Self {
        Self {
            data,
            total_count,
            skip,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(skip: Option<i64>, limit: Option<i64>) -> Page {
        Page::from(&Pagination { skip, limit })
    }

    #[test]
    fn test_defaults() {
        assert_eq!(page(None, None), Page { skip: 0, limit: DEFAULT_LIMIT });
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        assert_eq!(page(Some(-5), Some(1000)), Page { skip: 0, limit: MAX_LIMIT });
        assert_eq!(page(Some(20), Some(0)), Page { skip: 20, limit: 1 });
    }

    #[test]
    fn test_parsed_from_query_strings() {
        let parsed: Pagination = serde_json::from_str(r#"{"skip":"3","limit":"25"}"#).unwrap();
        assert_eq!(Page::from(&parsed), Page { skip: 3, limit: 25 });
    }
}
