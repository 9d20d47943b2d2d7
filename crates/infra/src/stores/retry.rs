//! Retry attempt storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use solvendo_core::{DomainResult, TenantId};
use solvendo_dunning::{DlqMessageId, RetryAttempt, RetryStatus};

/// Independent optional filters; AND semantics when both are given.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryFilter {
    pub message_id: Option<DlqMessageId>,
    pub status: Option<RetryStatus>,
}

pub trait RetryStore: Send + Sync {
    fn insert(&self, attempt: RetryAttempt) -> DomainResult<RetryAttempt>;

    /// Newest-first by `scheduled_at`.
    fn list(&self, tenant_id: TenantId, filter: RetryFilter) -> DomainResult<Vec<RetryAttempt>>;
}

/// In-memory retry store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRetryStore {
    attempts: RwLock<HashMap<TenantId, Vec<RetryAttempt>>>,
}

impl InMemoryRetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl RetryStore for InMemoryRetryStore {
    fn insert(&self, attempt: RetryAttempt) -> DomainResult<RetryAttempt> {
        let mut attempts = self.attempts.write().unwrap();
        attempts
            .entry(attempt.tenant_id)
            .or_default()
            .push(attempt.clone());
        Ok(attempt)
    }

    fn list(&self, tenant_id: TenantId, filter: RetryFilter) -> DomainResult<Vec<RetryAttempt>> {
        let attempts = self.attempts.read().unwrap();
        let mut result: Vec<RetryAttempt> = attempts
            .get(&tenant_id)
            .map(|list| {
                list.iter()
                    .filter(|a| filter.message_id.is_none_or(|id| a.message_id == id))
                    .filter(|a| filter.status.is_none_or(|s| a.status == s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        result.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(result)
    }
}
