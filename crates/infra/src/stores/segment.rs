//! Segment storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use solvendo_core::{DomainError, DomainResult, TenantId};
use solvendo_dunning::{Segment, SegmentDraft, SegmentId, SegmentPatch};

pub trait SegmentStore: Send + Sync {
    /// Validate the draft, mint an id and store the segment.
    fn create(
        &self,
        tenant_id: TenantId,
        draft: SegmentDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Segment>;

    /// Partial merge; the merged result is revalidated before it replaces the
    /// stored segment.
    fn update(
        &self,
        tenant_id: TenantId,
        id: SegmentId,
        patch: SegmentPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Segment>;

    fn get(&self, tenant_id: TenantId, id: SegmentId) -> DomainResult<Option<Segment>>;

    /// Segments in insertion order.
    fn list(&self, tenant_id: TenantId) -> DomainResult<Vec<Segment>>;

    /// Tenants that currently have segments.
    fn tenants(&self) -> DomainResult<Vec<TenantId>>;
}

/// In-memory segment store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySegmentStore {
    // Vec keeps insertion order per tenant.
    segments: RwLock<HashMap<TenantId, Vec<Segment>>>,
}

impl InMemorySegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl SegmentStore for InMemorySegmentStore {
    fn create(
        &self,
        tenant_id: TenantId,
        draft: SegmentDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Segment> {
        let segment = Segment::create(tenant_id, draft, now)?;
        let mut segments = self.segments.write().unwrap();
        segments.entry(tenant_id).or_default().push(segment.clone());
        Ok(segment)
    }

    fn update(
        &self,
        tenant_id: TenantId,
        id: SegmentId,
        patch: SegmentPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Segment> {
        let mut segments = self.segments.write().unwrap();
        let segment = segments
            .get_mut(&tenant_id)
            .and_then(|list| list.iter_mut().find(|s| s.id == id))
            .ok_or(DomainError::NotFound)?;
        segment.apply(patch, now)?;
        Ok(segment.clone())
    }

    fn get(&self, tenant_id: TenantId, id: SegmentId) -> DomainResult<Option<Segment>> {
        let segments = self.segments.read().unwrap();
        Ok(segments
            .get(&tenant_id)
            .and_then(|list| list.iter().find(|s| s.id == id))
            .cloned())
    }

    fn list(&self, tenant_id: TenantId) -> DomainResult<Vec<Segment>> {
        let segments = self.segments.read().unwrap();
        Ok(segments.get(&tenant_id).cloned().unwrap_or_default())
    }

    fn tenants(&self) -> DomainResult<Vec<TenantId>> {
        let segments = self.segments.read().unwrap();
        Ok(segments.keys().copied().collect())
    }
}
