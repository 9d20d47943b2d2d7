//! Engine statistics, computed on demand from the stores.

use chrono::{DateTime, Utc};
use serde::Serialize;

use solvendo_core::{DomainResult, TenantId};
use solvendo_dunning::{KpiStatus, MessageStatus, RetryStatus, SegmentId};

use crate::stores::{DlqFilter, DlqStore, KpiFilter, KpiStore, RetryFilter, RetryStore, SegmentStore};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DlqStats {
    pub total_messages: usize,
    pub pending: usize,
    pub processing: usize,
    pub retried: usize,
    pub dead: usize,
    pub resolved: usize,
    pub retry_success_rate: f64,
    pub avg_retry_time_minutes: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiStats {
    pub on_target: usize,
    pub below_target: usize,
    pub above_target: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub segment_id: SegmentId,
    pub name: String,
    pub messages: usize,
    pub resolved: usize,
    pub dead: usize,
    pub collection_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DunningStats {
    pub dlq: DlqStats,
    pub kpis: KpiStats,
    pub segments: Vec<SegmentStats>,
    pub active_segments: usize,
    pub last_updated: DateTime<Utc>,
}

/// Snapshot the engine's current state for a tenant.
pub fn compute(
    tenant_id: TenantId,
    segments: &dyn SegmentStore,
    dlq: &dyn DlqStore,
    retries: &dyn RetryStore,
    kpis: &dyn KpiStore,
    now: DateTime<Utc>,
) -> DomainResult<DunningStats> {
    let messages = dlq.list(tenant_id, DlqFilter::default())?;
    let attempts = retries.list(tenant_id, RetryFilter::default())?;
    let records = kpis.list(tenant_id, KpiFilter::default())?;
    let segment_list = segments.list(tenant_id)?;

    let count = |status: MessageStatus| messages.iter().filter(|m| m.status == status).count();

    let terminal_attempts: Vec<_> = attempts
        .iter()
        .filter(|a| a.status.is_terminal())
        .collect();
    let successes = terminal_attempts
        .iter()
        .filter(|a| a.status == RetryStatus::Success)
        .count();
    let retry_success_rate = if terminal_attempts.is_empty() {
        0.0
    } else {
        successes as f64 / terminal_attempts.len() as f64
    };

    let durations: Vec<f64> = attempts
        .iter()
        .filter_map(|a| a.duration())
        .map(|d| d.num_milliseconds() as f64 / 60_000.0)
        .collect();
    let avg_retry_time_minutes = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    let dlq_stats = DlqStats {
        total_messages: messages.len(),
        pending: count(MessageStatus::Pending),
        processing: count(MessageStatus::Processing),
        retried: count(MessageStatus::Retried),
        dead: count(MessageStatus::Dead),
        resolved: count(MessageStatus::Resolved),
        retry_success_rate,
        avg_retry_time_minutes,
    };

    let by_status = |status: KpiStatus| records.iter().filter(|r| r.status == status).count();
    let kpi_stats = KpiStats {
        on_target: by_status(KpiStatus::OnTarget),
        below_target: by_status(KpiStatus::BelowTarget),
        above_target: by_status(KpiStatus::AboveTarget),
        critical: by_status(KpiStatus::Critical),
    };

    let active_segments = segment_list.iter().filter(|s| s.is_active).count();
    let segment_stats = segment_list
        .into_iter()
        .map(|segment| {
            let owned: Vec<_> = messages
                .iter()
                .filter(|m| m.segment_id == Some(segment.id))
                .collect();
            let resolved = owned
                .iter()
                .filter(|m| m.status == MessageStatus::Resolved)
                .count();
            let dead = owned.iter().filter(|m| m.status == MessageStatus::Dead).count();
            let collection_rate = if owned.is_empty() {
                0.0
            } else {
                resolved as f64 / owned.len() as f64
            };
            SegmentStats {
                segment_id: segment.id,
                name: segment.name,
                messages: owned.len(),
                resolved,
                dead,
                collection_rate,
            }
        })
        .collect();

    Ok(DunningStats {
        dlq: dlq_stats,
        kpis: kpi_stats,
        segments: segment_stats,
        active_segments,
        last_updated: now,
    })
}
