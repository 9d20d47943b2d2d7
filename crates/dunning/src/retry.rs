//! Retry attempt records and the backoff policy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solvendo_core::{TenantId, impl_uuid_newtype};

use crate::message::DlqMessageId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetryId(Uuid);

impl_uuid_newtype!(RetryId, "RetryId");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl RetryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    Immediate,
    ExponentialBackoff,
    Linear,
    Custom,
}

/// One delivery attempt for a DLQ message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryAttempt {
    pub id: RetryId,
    pub tenant_id: TenantId,
    pub message_id: DlqMessageId,
    pub attempt_number: u32,
    pub status: RetryStatus,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub retry_strategy: RetryStrategy,
    pub backoff_multiplier: f64,
    /// Minutes.
    pub max_backoff_time: u32,
}

impl RetryAttempt {
    pub fn scheduled(
        tenant_id: TenantId,
        message_id: DlqMessageId,
        attempt_number: u32,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RetryId::new(),
            tenant_id,
            message_id,
            attempt_number,
            status: RetryStatus::Pending,
            scheduled_at,
            started_at: None,
            completed_at: None,
            error_message: None,
            retry_strategy: RetryStrategy::ExponentialBackoff,
            backoff_multiplier: 2.0,
            max_backoff_time: 24 * 60,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.status = RetryStatus::Processing;
        self.started_at = Some(now);
    }

    pub fn succeed(&mut self, now: DateTime<Utc>) {
        self.status = RetryStatus::Success;
        self.completed_at = Some(now);
    }

    pub fn fail(&mut self, now: DateTime<Utc>, error: impl Into<String>) {
        self.status = RetryStatus::Failed;
        self.completed_at = Some(now);
        self.error_message = Some(error.into());
    }

    /// Duration of a completed attempt, if both timestamps exist.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Interval-ladder backoff with deterministic jitter.
///
/// The ladder is indexed by the retry count and clamped to the last rung.
/// Jitter is derived from (message id, attempt), so two replicas computing the
/// schedule for the same message agree, while distinct messages retrying after
/// a shared outage spread out instead of herding.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    intervals_hours: Vec<u32>,
    jitter: f64,
}

impl Backoff {
    /// `jitter` is the +/- fraction applied to the rung, e.g. 0.1 for 10%.
    pub fn new(intervals_hours: Vec<u32>, jitter: f64) -> Self {
        debug_assert!(!intervals_hours.is_empty());
        debug_assert!((0.0..1.0).contains(&jitter));
        Self { intervals_hours, jitter }
    }

    pub fn delay_for(&self, message_id: DlqMessageId, retry_count: u32) -> Duration {
        let index = (retry_count as usize).min(self.intervals_hours.len() - 1);
        let base_secs = f64::from(self.intervals_hours[index]) * 3600.0;
        let factor = 1.0 + self.jitter * (2.0 * jitter_unit(message_id, retry_count) - 1.0);
        Duration::seconds((base_secs * factor) as i64)
    }

    pub fn schedule_from(
        &self,
        now: DateTime<Utc>,
        message_id: DlqMessageId,
        retry_count: u32,
    ) -> DateTime<Utc> {
        now + self.delay_for(message_id, retry_count)
    }
}

/// Deterministic pseudo-random value in [0, 1) keyed on (message id, attempt).
fn jitter_unit(message_id: DlqMessageId, retry_count: u32) -> f64 {
    let uuid: Uuid = message_id.into();
    let mut acc: u64 = u64::from(retry_count).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for byte in uuid.as_bytes() {
        acc = acc.wrapping_mul(31).wrapping_add(u64::from(*byte));
    }
    (acc % 1000) as f64 / 1000.0
}
