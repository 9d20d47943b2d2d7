//! Query DTOs and pagination helpers.
//!
//! Request bodies deserialize straight into the domain input types
//! (`SegmentDraft`, `SegmentPatch`, `DlqIntake`, `ConfigPatch`); their range
//! validation lives in the domain crate. This module covers the list-endpoint
//! query strings.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

use solvendo_dunning::{DlqMessageId, KpiPeriod, MessageStatus, Priority, RetryStatus, SegmentId};

use super::errors;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiQuery {
    pub segment_id: Option<SegmentId>,
    pub period: Option<KpiPeriod>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlqQuery {
    pub status: Option<MessageStatus>,
    pub priority: Option<Priority>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryQuery {
    pub message_id: Option<DlqMessageId>,
    pub status: Option<RetryStatus>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

/// Reject out-of-range pagination before touching the stores.
pub fn check_page(limit: usize) -> Result<(), axum::response::Response> {
    if (1..=MAX_LIMIT).contains(&limit) {
        Ok(())
    } else {
        Err(errors::fail(
            StatusCode::BAD_REQUEST,
            format!("limit must be between 1 and {MAX_LIMIT}"),
        ))
    }
}

/// Slice a full result set into `{ <key>: [...], pagination: {...} }`.
pub fn paginate<T: Serialize>(
    key: &str,
    items: Vec<T>,
    limit: usize,
    offset: usize,
) -> serde_json::Value {
    let total = items.len();
    let page: Vec<&T> = items.iter().skip(offset).take(limit).collect();
    json!({
        key: page,
        "pagination": {
            "limit": limit,
            "offset": offset,
            "total": total,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_reports_total() {
        let page = paginate("items", (0..10).collect::<Vec<i32>>(), 3, 4);
        assert_eq!(page["items"], json!([4, 5, 6]));
        assert_eq!(page["pagination"]["total"], 10);
        assert_eq!(page["pagination"]["limit"], 3);
        assert_eq!(page["pagination"]["offset"], 4);
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = paginate("items", vec![1, 2], 50, 10);
        assert_eq!(page["items"], json!([]));
        assert_eq!(page["pagination"]["total"], 2);
    }

    #[test]
    fn page_limits_enforced() {
        assert!(check_page(1).is_ok());
        assert!(check_page(100).is_ok());
        assert!(check_page(0).is_err());
        assert!(check_page(101).is_err());
    }
}
