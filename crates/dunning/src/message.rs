//! Dead-letter-queue messages.
//!
//! A `DlqMessage` is a delivery that failed upstream and now lives in the DLQ
//! with a bounded retry budget. Every mutation goes through a method that
//! checks the state machine and bumps `version`, so stores can expose atomic
//! check-and-mutate operations.
//!
//! ```text
//! pending -> processing -> retried
//!                |-> pending   (transient failure, budget remains)
//!                '-> dead      (budget exhausted)
//! any non-terminal -> resolved (operator action)
//! dead -> pending              (explicit requeue only, budget reset)
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solvendo_core::{DomainError, DomainResult, TenantId, impl_uuid_newtype};

use crate::segment::{Priority, SegmentId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DlqMessageId(Uuid);

impl_uuid_newtype!(DlqMessageId, "DlqMessageId");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    DunningStep,
    Escalation,
    Notification,
    Retry,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Processing,
    Retried,
    Dead,
    Resolved,
}

impl MessageStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Dead | Self::Resolved)
    }
}

/// Intake parameters for a new DLQ entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlqIntake {
    pub original_message_id: Uuid,
    pub queue_name: String,
    pub message_type: MessageType,
    pub payload: BTreeMap<String, serde_json::Value>,
    pub failure_reason: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<SegmentId>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl DlqIntake {
    pub fn validate(&self) -> DomainResult<()> {
        if self.queue_name.is_empty() || self.queue_name.len() > 100 {
            return Err(DomainError::validation(
                "queueName must be between 1 and 100 characters",
            ));
        }
        if self.failure_reason.is_empty() || self.failure_reason.len() > 500 {
            return Err(DomainError::validation(
                "failureReason must be between 1 and 500 characters",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlqMessage {
    pub id: DlqMessageId,
    pub tenant_id: TenantId,
    pub original_message_id: Uuid,
    pub queue_name: String,
    pub message_type: MessageType,
    pub payload: BTreeMap<String, serde_json::Value>,
    pub failure_reason: String,
    pub retry_count: u32,
    pub max_retries: u32,
    pub first_failure_at: DateTime<Utc>,
    pub last_failure_at: DateTime<Utc>,
    pub next_retry_at: DateTime<Utc>,
    pub status: MessageStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<SegmentId>,
    /// Optimistic concurrency counter, bumped on every mutation.
    pub version: u64,
}

impl DlqMessage {
    /// Build a fresh `pending` entry with an untouched retry budget.
    pub fn new(
        tenant_id: TenantId,
        intake: DlqIntake,
        max_retries: u32,
        next_retry_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        intake.validate()?;
        Ok(Self {
            id: DlqMessageId::new(),
            tenant_id,
            original_message_id: intake.original_message_id,
            queue_name: intake.queue_name,
            message_type: intake.message_type,
            payload: intake.payload,
            failure_reason: intake.failure_reason,
            retry_count: 0,
            max_retries,
            first_failure_at: now,
            last_failure_at: now,
            next_retry_at,
            status: MessageStatus::Pending,
            priority: intake.priority,
            segment_id: intake.segment_id,
            version: 0,
        })
    }

    pub fn budget_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// Claim the message for a retry attempt (`pending -> processing`).
    ///
    /// Increments `retry_count` and reschedules `next_retry_at` via the
    /// supplied policy, keyed on the post-increment count so the ladder index
    /// advances with the attempt. Returns the attempt number.
    pub fn begin_attempt(
        &mut self,
        now: DateTime<Utc>,
        schedule: impl FnOnce(u32) -> DateTime<Utc>,
    ) -> DomainResult<u32> {
        if self.status != MessageStatus::Pending {
            return Err(DomainError::conflict(format!(
                "message is {:?}, only pending messages can be claimed",
                self.status
            )));
        }
        if self.budget_exhausted() {
            return Err(DomainError::conflict("retry budget exhausted"));
        }
        self.retry_count += 1;
        self.last_failure_at = now;
        self.next_retry_at = schedule(self.retry_count);
        self.status = MessageStatus::Processing;
        self.version += 1;
        Ok(self.retry_count)
    }

    /// The claimed attempt delivered (`processing -> retried`).
    pub fn record_success(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.transition(MessageStatus::Processing, MessageStatus::Retried)?;
        self.last_failure_at = now;
        Ok(())
    }

    /// The claimed attempt failed but budget remains (`processing -> pending`).
    pub fn record_failure(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.transition(MessageStatus::Processing, MessageStatus::Pending)?;
        self.last_failure_at = now;
        Ok(())
    }

    /// Retry budget exhausted; park the message (`-> dead`).
    pub fn mark_dead(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "message is already {:?}",
                self.status
            )));
        }
        self.status = MessageStatus::Dead;
        self.last_failure_at = now;
        self.version += 1;
        Ok(())
    }

    /// Operator resolution (`any non-terminal -> resolved`).
    pub fn resolve(&mut self) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "message is already {:?}",
                self.status
            )));
        }
        self.status = MessageStatus::Resolved;
        self.version += 1;
        Ok(())
    }

    /// Deliberate `dead -> pending` with a fresh retry budget.
    pub fn requeue(
        &mut self,
        max_retries: u32,
        next_retry_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != MessageStatus::Dead {
            return Err(DomainError::conflict(format!(
                "only dead messages can be requeued, message is {:?}",
                self.status
            )));
        }
        self.status = MessageStatus::Pending;
        self.retry_count = 0;
        self.max_retries = max_retries;
        self.next_retry_at = next_retry_at;
        self.version += 1;
        Ok(())
    }

    fn transition(&mut self, from: MessageStatus, to: MessageStatus) -> DomainResult<()> {
        if self.status != from {
            return Err(DomainError::conflict(format!(
                "expected {:?}, message is {:?}",
                from, self.status
            )));
        }
        self.status = to;
        self.version += 1;
        Ok(())
    }
}
