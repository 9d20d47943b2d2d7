//! KPI records: measured per-segment metrics compared against targets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solvendo_core::{TenantId, impl_uuid_newtype};

use crate::config::EscalationThresholds;
use crate::segment::SegmentId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiId(Uuid);

impl_uuid_newtype!(KpiId, "KpiId");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiMetric {
    CollectionRate,
    ResponseTime,
    FailureRate,
}

impl KpiMetric {
    pub fn unit(self) -> &'static str {
        match self {
            Self::CollectionRate | Self::FailureRate => "percentage",
            Self::ResponseTime => "hours",
        }
    }

    /// Whether larger values are better for this metric.
    pub fn higher_is_better(self) -> bool {
        matches!(self, Self::CollectionRate)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiPeriod {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    OnTarget,
    BelowTarget,
    AboveTarget,
    Critical,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiTrend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiRecord {
    pub id: KpiId,
    pub tenant_id: TenantId,
    pub segment_id: SegmentId,
    pub metric: KpiMetric,
    pub value: f64,
    pub target: f64,
    pub unit: &'static str,
    pub period: KpiPeriod,
    pub timestamp: DateTime<Utc>,
    pub status: KpiStatus,
    pub trend: KpiTrend,
}

impl KpiRecord {
    /// Build a record from a measured value, classifying status against the
    /// target and trend against the previous value for the same series.
    pub fn measured(
        tenant_id: TenantId,
        segment_id: SegmentId,
        metric: KpiMetric,
        value: f64,
        target: f64,
        period: KpiPeriod,
        timestamp: DateTime<Utc>,
        thresholds: &EscalationThresholds,
        previous_value: Option<f64>,
    ) -> Self {
        Self {
            id: KpiId::new(),
            tenant_id,
            segment_id,
            metric,
            value,
            target,
            unit: metric.unit(),
            period,
            timestamp,
            status: classify(metric, value, target, thresholds),
            trend: trend(metric, value, previous_value),
        }
    }
}

/// Status policy:
/// - meets the target -> `on_target`, beats it by more than 10% -> `above_target`
/// - misses the target -> `below_target`, or `critical` when the corresponding
///   escalation threshold is breached as well
pub fn classify(
    metric: KpiMetric,
    value: f64,
    target: f64,
    thresholds: &EscalationThresholds,
) -> KpiStatus {
    if metric.higher_is_better() {
        if value >= target {
            if value > target * 1.10 {
                KpiStatus::AboveTarget
            } else {
                KpiStatus::OnTarget
            }
        } else if breaches_threshold(metric, value, thresholds) {
            KpiStatus::Critical
        } else {
            KpiStatus::BelowTarget
        }
    } else if value <= target {
        if value < target * 0.90 {
            KpiStatus::AboveTarget
        } else {
            KpiStatus::OnTarget
        }
    } else if breaches_threshold(metric, value, thresholds) {
        KpiStatus::Critical
    } else {
        KpiStatus::BelowTarget
    }
}

fn breaches_threshold(metric: KpiMetric, value: f64, thresholds: &EscalationThresholds) -> bool {
    match metric {
        KpiMetric::CollectionRate => value < thresholds.collection_rate,
        KpiMetric::ResponseTime => value > thresholds.response_time,
        KpiMetric::FailureRate => value > thresholds.failure_rate,
    }
}

/// Trend against the previous record of the same series, with a +/-5% band
/// counting as `stable`.
pub fn trend(metric: KpiMetric, value: f64, previous_value: Option<f64>) -> KpiTrend {
    let Some(previous) = previous_value else {
        return KpiTrend::Stable;
    };
    let delta = value - previous;
    if delta.abs() <= previous.abs() * 0.05 {
        return KpiTrend::Stable;
    }
    if (delta > 0.0) == metric.higher_is_better() {
        KpiTrend::Improving
    } else {
        KpiTrend::Declining
    }
}
