//! Engine events fanned out to realtime subscribers (SSE).

use chrono::{DateTime, Utc};
use serde::Serialize;

use solvendo_core::TenantId;

/// A tenant-scoped engine event.
///
/// Carried over a `tokio::sync::broadcast` channel; subscribers filter by
/// tenant before forwarding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineEvent {
    pub tenant_id: TenantId,
    /// Dotted topic, e.g. `dlq.message_added` or `segment.created`.
    pub topic: String,
    pub payload: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl EngineEvent {
    pub fn new(
        tenant_id: TenantId,
        topic: impl Into<String>,
        payload: serde_json::Value,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            tenant_id,
            topic: topic.into(),
            payload,
            at,
        }
    }
}
