//! Engine configuration (per tenant).

use serde::{Deserialize, Serialize};

use solvendo_core::{DomainError, DomainResult};

/// KPI boundaries beyond which a missed target is classified `critical`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationThresholds {
    /// Fraction in [0, 1]; collection rates below this are critical.
    pub collection_rate: f64,
    /// Hours; response times above this are critical.
    pub response_time: f64,
    /// Fraction in [0, 1]; failure rates above this are critical.
    pub failure_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DunningConfig {
    pub enabled: bool,
    pub max_retries: u32,
    /// Backoff ladder in hours, indexed by retry count.
    pub retry_intervals: Vec<u32>,
    pub dlq_retention_days: u32,
    /// Minutes between KPI recomputations.
    pub kpi_calculation_interval: u32,
    /// Stored but not acted on; there is no automatic escalation trigger.
    pub auto_escalation: bool,
    pub escalation_thresholds: EscalationThresholds,
    pub notification_enabled: bool,
}

impl Default for DunningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 5,
            // 1h, 6h, 1d, 3d, 1w
            retry_intervals: vec![1, 6, 24, 72, 168],
            dlq_retention_days: 30,
            kpi_calculation_interval: 60,
            auto_escalation: true,
            escalation_thresholds: EscalationThresholds {
                collection_rate: 0.8,
                response_time: 24.0,
                failure_rate: 0.1,
            },
            notification_enabled: true,
        }
    }
}

impl DunningConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if !(1..=10).contains(&self.max_retries) {
            return Err(DomainError::validation(
                "maxRetries must be between 1 and 10",
            ));
        }
        if self.retry_intervals.is_empty() {
            return Err(DomainError::validation("retryIntervals must not be empty"));
        }
        if self.retry_intervals.iter().any(|h| !(1..=168).contains(h)) {
            return Err(DomainError::validation(
                "retryIntervals entries must be between 1 and 168 hours",
            ));
        }
        if !(1..=365).contains(&self.dlq_retention_days) {
            return Err(DomainError::validation(
                "dlqRetentionDays must be between 1 and 365",
            ));
        }
        if !(1..=1440).contains(&self.kpi_calculation_interval) {
            return Err(DomainError::validation(
                "kpiCalculationInterval must be between 1 and 1440 minutes",
            ));
        }
        let t = &self.escalation_thresholds;
        if !(0.0..=1.0).contains(&t.collection_rate) || !(0.0..=1.0).contains(&t.failure_rate) {
            return Err(DomainError::validation(
                "escalationThresholds rates must be between 0 and 1",
            ));
        }
        if !t.response_time.is_finite() || t.response_time <= 0.0 {
            return Err(DomainError::validation(
                "escalationThresholds.responseTime must be positive",
            ));
        }
        Ok(())
    }

    /// Merge a partial update and validate the result.
    pub fn merged(&self, patch: ConfigPatch) -> DomainResult<Self> {
        let mut next = self.clone();
        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(max_retries) = patch.max_retries {
            next.max_retries = max_retries;
        }
        if let Some(retry_intervals) = patch.retry_intervals {
            next.retry_intervals = retry_intervals;
        }
        if let Some(days) = patch.dlq_retention_days {
            next.dlq_retention_days = days;
        }
        if let Some(minutes) = patch.kpi_calculation_interval {
            next.kpi_calculation_interval = minutes;
        }
        if let Some(auto_escalation) = patch.auto_escalation {
            next.auto_escalation = auto_escalation;
        }
        if let Some(thresholds) = patch.escalation_thresholds {
            next.escalation_thresholds = thresholds;
        }
        if let Some(notification_enabled) = patch.notification_enabled {
            next.notification_enabled = notification_enabled;
        }
        next.validate()?;
        Ok(next)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_intervals: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlq_retention_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpi_calculation_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_escalation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_thresholds: Option<EscalationThresholds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DunningConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_intervals, vec![1, 6, 24, 72, 168]);
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn merge_applies_only_given_fields() {
        let base = DunningConfig::default();
        let patch = ConfigPatch {
            max_retries: Some(3),
            ..Default::default()
        };
        let next = base.merged(patch).unwrap();
        assert_eq!(next.max_retries, 3);
        assert_eq!(next.retry_intervals, base.retry_intervals);
    }

    #[test]
    fn merge_rejects_invalid_result() {
        let base = DunningConfig::default();
        let patch = ConfigPatch {
            retry_intervals: Some(vec![]),
            ..Default::default()
        };
        assert!(base.merged(patch).is_err());
        let patch = ConfigPatch {
            max_retries: Some(0),
            ..Default::default()
        };
        assert!(base.merged(patch).is_err());
    }

    #[test]
    fn wire_format_matches_api_contract() {
        let json = serde_json::to_value(DunningConfig::default()).unwrap();
        assert!(json.get("maxRetries").is_some());
        assert!(json.get("retryIntervals").is_some());
        assert!(json.get("kpiCalculationInterval").is_some());
        assert!(json["escalationThresholds"].get("collectionRate").is_some());
    }
}
