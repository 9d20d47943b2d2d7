//! Dev/test seed data: the three stock segments.

use chrono::{DateTime, Utc};

use solvendo_core::{DomainResult, TenantId};
use solvendo_dunning::{
    AmountRange, Channel, CustomerType, DayRange, Priority, RiskLevel, Segment, SegmentCriteria,
    SegmentDraft, SegmentKpiTargets, SegmentStrategy,
};

use crate::stores::SegmentStore;

/// The stock low/medium/high risk presets.
pub fn default_segment_drafts() -> Vec<SegmentDraft> {
    vec![
        SegmentDraft {
            name: "Low Risk - Small Amounts".into(),
            description: "Customers with low risk and small overdue amounts".into(),
            criteria: SegmentCriteria {
                overdue_days: DayRange { min: 1, max: 30 },
                amount_range: AmountRange { min: 0.0, max: 1000.0 },
                customer_type: CustomerType::Both,
                risk_level: RiskLevel::Low,
                industry: None,
                region: None,
            },
            strategy: SegmentStrategy {
                max_retries: 3,
                retry_interval: 24,
                escalation_steps: 2,
                communication_channels: vec![Channel::Email, Channel::Sms],
                priority: Priority::Low,
            },
            kpis: SegmentKpiTargets {
                target_collection_rate: 0.85,
                target_response_time: 48.0,
                max_dunning_duration: 30,
                acceptable_failure_rate: 0.05,
            },
            is_active: true,
        },
        SegmentDraft {
            name: "Medium Risk - Medium Amounts".into(),
            description: "Customers with medium risk and medium overdue amounts".into(),
            criteria: SegmentCriteria {
                overdue_days: DayRange { min: 31, max: 90 },
                amount_range: AmountRange { min: 1001.0, max: 10000.0 },
                customer_type: CustomerType::Both,
                risk_level: RiskLevel::Medium,
                industry: None,
                region: None,
            },
            strategy: SegmentStrategy {
                max_retries: 4,
                retry_interval: 12,
                escalation_steps: 3,
                communication_channels: vec![Channel::Email, Channel::Call, Channel::Sms],
                priority: Priority::Medium,
            },
            kpis: SegmentKpiTargets {
                target_collection_rate: 0.75,
                target_response_time: 24.0,
                max_dunning_duration: 45,
                acceptable_failure_rate: 0.1,
            },
            is_active: true,
        },
        SegmentDraft {
            name: "High Risk - Large Amounts".into(),
            description: "Customers with high risk and large overdue amounts".into(),
            criteria: SegmentCriteria {
                overdue_days: DayRange { min: 91, max: 365 },
                amount_range: AmountRange { min: 10001.0, max: 100000.0 },
                customer_type: CustomerType::Both,
                risk_level: RiskLevel::High,
                industry: None,
                region: None,
            },
            strategy: SegmentStrategy {
                max_retries: 5,
                retry_interval: 6,
                escalation_steps: 4,
                communication_channels: vec![Channel::Call, Channel::Letter, Channel::Email],
                priority: Priority::High,
            },
            kpis: SegmentKpiTargets {
                target_collection_rate: 0.6,
                target_response_time: 12.0,
                max_dunning_duration: 60,
                acceptable_failure_rate: 0.15,
            },
            is_active: true,
        },
    ]
}

/// Seed the stock segments for a tenant.
pub fn seed_default_segments(
    store: &dyn SegmentStore,
    tenant_id: TenantId,
    now: DateTime<Utc>,
) -> DomainResult<Vec<Segment>> {
    default_segment_drafts()
        .into_iter()
        .map(|draft| store.create(tenant_id, draft, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemorySegmentStore;

    #[test]
    fn stock_drafts_pass_validation() {
        let store = InMemorySegmentStore::new();
        let seeded = seed_default_segments(&store, TenantId::new(), Utc::now()).unwrap();
        assert_eq!(seeded.len(), 3);
        assert!(seeded.iter().all(|s| s.is_active));
    }
}
