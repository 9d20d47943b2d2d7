//! KPI record storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use solvendo_core::{DomainResult, TenantId};
use solvendo_dunning::{KpiMetric, KpiPeriod, KpiRecord, SegmentId};

/// Independent optional filters; AND semantics when both are given.
#[derive(Debug, Clone, Copy, Default)]
pub struct KpiFilter {
    pub segment_id: Option<SegmentId>,
    pub period: Option<KpiPeriod>,
}

pub trait KpiStore: Send + Sync {
    fn insert(&self, record: KpiRecord) -> DomainResult<KpiRecord>;

    /// Newest-first by `timestamp`.
    fn list(&self, tenant_id: TenantId, filter: KpiFilter) -> DomainResult<Vec<KpiRecord>>;

    /// Most recent value for a (segment, metric, period) series.
    fn latest_value(
        &self,
        tenant_id: TenantId,
        segment_id: SegmentId,
        metric: KpiMetric,
        period: KpiPeriod,
    ) -> DomainResult<Option<f64>>;
}

/// In-memory KPI store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryKpiStore {
    records: RwLock<HashMap<TenantId, Vec<KpiRecord>>>,
}

impl InMemoryKpiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl KpiStore for InMemoryKpiStore {
    fn insert(&self, record: KpiRecord) -> DomainResult<KpiRecord> {
        let mut records = self.records.write().unwrap();
        records
            .entry(record.tenant_id)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn list(&self, tenant_id: TenantId, filter: KpiFilter) -> DomainResult<Vec<KpiRecord>> {
        let records = self.records.read().unwrap();
        let mut result: Vec<KpiRecord> = records
            .get(&tenant_id)
            .map(|list| {
                list.iter()
                    .filter(|r| filter.segment_id.is_none_or(|s| r.segment_id == s))
                    .filter(|r| filter.period.is_none_or(|p| r.period == p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(result)
    }

    fn latest_value(
        &self,
        tenant_id: TenantId,
        segment_id: SegmentId,
        metric: KpiMetric,
        period: KpiPeriod,
    ) -> DomainResult<Option<f64>> {
        let records = self.records.read().unwrap();
        Ok(records
            .get(&tenant_id)
            .and_then(|list| {
                list.iter()
                    .filter(|r| {
                        r.segment_id == segment_id && r.metric == metric && r.period == period
                    })
                    .max_by_key(|r| r.timestamp)
            })
            .map(|r| r.value))
    }
}
