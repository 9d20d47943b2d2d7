//! Dead-letter-queue storage.
//!
//! Status transitions are check-and-mutate under the write lock, so two
//! concurrent retries of the same message cannot both claim it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use solvendo_core::{DomainError, DomainResult, TenantId};
use solvendo_dunning::{DlqMessage, DlqMessageId, MessageStatus, Priority};

/// Independent optional filters; AND semantics when both are given.
#[derive(Debug, Clone, Copy, Default)]
pub struct DlqFilter {
    pub status: Option<MessageStatus>,
    pub priority: Option<Priority>,
}

pub trait DlqStore: Send + Sync {
    fn insert(&self, message: DlqMessage) -> DomainResult<DlqMessage>;

    fn get(&self, tenant_id: TenantId, id: DlqMessageId) -> DomainResult<Option<DlqMessage>>;

    /// Newest-first by `first_failure_at`.
    fn list(&self, tenant_id: TenantId, filter: DlqFilter) -> DomainResult<Vec<DlqMessage>>;

    /// Atomically claim a `pending` message for a retry attempt.
    ///
    /// Increments the retry count and reschedules via `schedule` (keyed on the
    /// post-increment count). Returns the updated message and the attempt
    /// number. Claiming a message in any other status is a conflict.
    fn claim_for_retry(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
        schedule: &dyn Fn(u32) -> DateTime<Utc>,
    ) -> DomainResult<(DlqMessage, u32)>;

    fn record_success(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
    ) -> DomainResult<DlqMessage>;

    fn record_failure(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
    ) -> DomainResult<DlqMessage>;

    fn mark_dead(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
    ) -> DomainResult<DlqMessage>;

    fn resolve(&self, tenant_id: TenantId, id: DlqMessageId) -> DomainResult<DlqMessage>;

    /// Deliberate `dead -> pending` with a fresh retry budget.
    fn requeue(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        max_retries: u32,
        next_retry_at: DateTime<Utc>,
    ) -> DomainResult<DlqMessage>;

    /// Ids of `pending` messages whose `next_retry_at` has passed, oldest
    /// schedule first.
    fn due(&self, tenant_id: TenantId, now: DateTime<Utc>) -> DomainResult<Vec<DlqMessageId>>;

    /// Drop terminal (`dead`/`resolved`) messages older than `cutoff`.
    /// Returns the number removed.
    fn purge_expired(&self, tenant_id: TenantId, cutoff: DateTime<Utc>) -> DomainResult<usize>;

    /// Tenants that currently have messages.
    fn tenants(&self) -> DomainResult<Vec<TenantId>>;
}

/// In-memory DLQ store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDlqStore {
    messages: RwLock<HashMap<TenantId, HashMap<DlqMessageId, DlqMessage>>>,
}

impl InMemoryDlqStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn with_message<R>(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        mutate: impl FnOnce(&mut DlqMessage) -> DomainResult<R>,
    ) -> DomainResult<(DlqMessage, R)> {
        let mut messages = self.messages.write().unwrap();
        let message = messages
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(DomainError::NotFound)?;
        let out = mutate(message)?;
        Ok((message.clone(), out))
    }
}

impl DlqStore for InMemoryDlqStore {
    fn insert(&self, message: DlqMessage) -> DomainResult<DlqMessage> {
        let mut messages = self.messages.write().unwrap();
        messages
            .entry(message.tenant_id)
            .or_default()
            .insert(message.id, message.clone());
        Ok(message)
    }

    fn get(&self, tenant_id: TenantId, id: DlqMessageId) -> DomainResult<Option<DlqMessage>> {
        let messages = self.messages.read().unwrap();
        Ok(messages
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .cloned())
    }

    fn list(&self, tenant_id: TenantId, filter: DlqFilter) -> DomainResult<Vec<DlqMessage>> {
        let messages = self.messages.read().unwrap();
        let mut result: Vec<DlqMessage> = messages
            .get(&tenant_id)
            .map(|m| {
                m.values()
                    .filter(|msg| filter.status.is_none_or(|s| msg.status == s))
                    .filter(|msg| filter.priority.is_none_or(|p| msg.priority == p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        result.sort_by(|a, b| b.first_failure_at.cmp(&a.first_failure_at));
        Ok(result)
    }

    fn claim_for_retry(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
        schedule: &dyn Fn(u32) -> DateTime<Utc>,
    ) -> DomainResult<(DlqMessage, u32)> {
        let (message, attempt) =
            self.with_message(tenant_id, id, |m| m.begin_attempt(now, schedule))?;
        Ok((message, attempt))
    }

    fn record_success(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
    ) -> DomainResult<DlqMessage> {
        Ok(self.with_message(tenant_id, id, |m| m.record_success(now))?.0)
    }

    fn record_failure(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
    ) -> DomainResult<DlqMessage> {
        Ok(self.with_message(tenant_id, id, |m| m.record_failure(now))?.0)
    }

    fn mark_dead(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        now: DateTime<Utc>,
    ) -> DomainResult<DlqMessage> {
        Ok(self.with_message(tenant_id, id, |m| m.mark_dead(now))?.0)
    }

    fn resolve(&self, tenant_id: TenantId, id: DlqMessageId) -> DomainResult<DlqMessage> {
        Ok(self.with_message(tenant_id, id, |m| m.resolve())?.0)
    }

    fn requeue(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
        max_retries: u32,
        next_retry_at: DateTime<Utc>,
    ) -> DomainResult<DlqMessage> {
        Ok(self
            .with_message(tenant_id, id, |m| m.requeue(max_retries, next_retry_at))?
            .0)
    }

    fn due(&self, tenant_id: TenantId, now: DateTime<Utc>) -> DomainResult<Vec<DlqMessageId>> {
        let messages = self.messages.read().unwrap();
        let mut due: Vec<&DlqMessage> = messages
            .get(&tenant_id)
            .map(|m| {
                m.values()
                    .filter(|msg| msg.status == MessageStatus::Pending && msg.next_retry_at <= now)
                    .collect()
            })
            .unwrap_or_default();
        due.sort_by_key(|msg| msg.next_retry_at);
        Ok(due.into_iter().map(|msg| msg.id).collect())
    }

    fn purge_expired(&self, tenant_id: TenantId, cutoff: DateTime<Utc>) -> DomainResult<usize> {
        let mut messages = self.messages.write().unwrap();
        let Some(tenant_messages) = messages.get_mut(&tenant_id) else {
            return Ok(0);
        };
        let before = tenant_messages.len();
        tenant_messages
            .retain(|_, msg| !(msg.status.is_terminal() && msg.last_failure_at < cutoff));
        Ok(before - tenant_messages.len())
    }

    fn tenants(&self) -> DomainResult<Vec<TenantId>> {
        let messages = self.messages.read().unwrap();
        Ok(messages.keys().copied().collect())
    }
}
