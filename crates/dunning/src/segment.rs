//! Dunning segments: eligibility criteria, retry/communication strategy and
//! target KPIs for a slice of the overdue-invoice population.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use solvendo_core::{DomainError, DomainResult, TenantId, impl_uuid_newtype};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(Uuid);

impl_uuid_newtype!(SegmentId, "SegmentId");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Individual,
    Business,
    Both,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Outbound communication channel for dunning steps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Call,
    Letter,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Inclusive day range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub min: u32,
    pub max: u32,
}

/// Inclusive monetary range (criteria threshold, not arithmetic money).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentCriteria {
    pub overdue_days: DayRange,
    pub amount_range: AmountRange,
    pub customer_type: CustomerType,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStrategy {
    pub max_retries: u32,
    /// Hours between dunning steps.
    pub retry_interval: u32,
    pub escalation_steps: u32,
    pub communication_channels: Vec<Channel>,
    pub priority: Priority,
}

/// Target KPIs the segment is held against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentKpiTargets {
    /// Fraction in [0, 1].
    pub target_collection_rate: f64,
    /// Hours.
    pub target_response_time: f64,
    /// Days.
    pub max_dunning_duration: u32,
    /// Fraction in [0, 1].
    pub acceptable_failure_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: SegmentId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: String,
    pub criteria: SegmentCriteria,
    pub strategy: SegmentStrategy,
    pub kpis: SegmentKpiTargets,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDraft {
    pub name: String,
    pub description: String,
    pub criteria: SegmentCriteria,
    pub strategy: SegmentStrategy,
    pub kpis: SegmentKpiTargets,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<SegmentCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<SegmentStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpis: Option<SegmentKpiTargets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl SegmentCriteria {
    fn validate(&self) -> DomainResult<()> {
        if self.overdue_days.min > self.overdue_days.max {
            return Err(DomainError::validation(
                "criteria.overdueDays: min must not exceed max",
            ));
        }
        if !self.amount_range.min.is_finite() || !self.amount_range.max.is_finite() {
            return Err(DomainError::validation(
                "criteria.amountRange: bounds must be finite",
            ));
        }
        if self.amount_range.min < 0.0 {
            return Err(DomainError::validation(
                "criteria.amountRange: min must not be negative",
            ));
        }
        if self.amount_range.min > self.amount_range.max {
            return Err(DomainError::validation(
                "criteria.amountRange: min must not exceed max",
            ));
        }
        Ok(())
    }
}

impl SegmentStrategy {
    fn validate(&self) -> DomainResult<()> {
        if !(1..=10).contains(&self.max_retries) {
            return Err(DomainError::validation(
                "strategy.maxRetries must be between 1 and 10",
            ));
        }
        if !(1..=168).contains(&self.retry_interval) {
            return Err(DomainError::validation(
                "strategy.retryInterval must be between 1 and 168 hours",
            ));
        }
        if !(1..=10).contains(&self.escalation_steps) {
            return Err(DomainError::validation(
                "strategy.escalationSteps must be between 1 and 10",
            ));
        }
        if self.communication_channels.is_empty() {
            return Err(DomainError::validation(
                "strategy.communicationChannels must not be empty",
            ));
        }
        Ok(())
    }
}

impl SegmentKpiTargets {
    fn validate(&self) -> DomainResult<()> {
        if !(0.0..=1.0).contains(&self.target_collection_rate) {
            return Err(DomainError::validation(
                "kpis.targetCollectionRate must be between 0 and 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.acceptable_failure_rate) {
            return Err(DomainError::validation(
                "kpis.acceptableFailureRate must be between 0 and 1",
            ));
        }
        if !(1.0..=168.0).contains(&self.target_response_time) {
            return Err(DomainError::validation(
                "kpis.targetResponseTime must be between 1 and 168 hours",
            ));
        }
        if !(1..=365).contains(&self.max_dunning_duration) {
            return Err(DomainError::validation(
                "kpis.maxDunningDuration must be between 1 and 365 days",
            ));
        }
        Ok(())
    }
}

impl SegmentDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() || self.name.len() > 100 {
            return Err(DomainError::validation(
                "name must be between 1 and 100 characters",
            ));
        }
        self.criteria.validate()?;
        self.strategy.validate()?;
        self.kpis.validate()
    }
}

impl Segment {
    /// Validate the draft and mint a new segment.
    pub fn create(tenant_id: TenantId, draft: SegmentDraft, now: DateTime<Utc>) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id: SegmentId::new(),
            tenant_id,
            name: draft.name,
            description: draft.description,
            criteria: draft.criteria,
            strategy: draft.strategy,
            kpis: draft.kpis,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge a partial update and revalidate the result.
    pub fn apply(&mut self, patch: SegmentPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let mut merged = self.clone();
        if let Some(name) = patch.name {
            merged.name = name;
        }
        if let Some(description) = patch.description {
            merged.description = description;
        }
        if let Some(criteria) = patch.criteria {
            merged.criteria = criteria;
        }
        if let Some(strategy) = patch.strategy {
            merged.strategy = strategy;
        }
        if let Some(kpis) = patch.kpis {
            merged.kpis = kpis;
        }
        if let Some(is_active) = patch.is_active {
            merged.is_active = is_active;
        }

        let draft = SegmentDraft {
            name: merged.name.clone(),
            description: merged.description.clone(),
            criteria: merged.criteria.clone(),
            strategy: merged.strategy.clone(),
            kpis: merged.kpis.clone(),
            is_active: merged.is_active,
        };
        draft.validate()?;

        merged.updated_at = now;
        *self = merged;
        Ok(())
    }
}
