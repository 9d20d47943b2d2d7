//! KPI aggregator: computes per-segment metrics from real execution history.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use solvendo_core::{DomainResult, TenantId};
use solvendo_dunning::{KpiMetric, KpiPeriod, KpiRecord, MessageStatus};

use crate::clock::Clock;
use crate::stores::{ConfigStore, DlqFilter, DlqStore, KpiStore, RetryStore, SegmentStore};

#[derive(Debug, Clone)]
pub struct KpiAggregatorConfig {
    /// How often the loop wakes up to check which tenants are due.
    pub tick_interval: Duration,
    /// Name for logging.
    pub name: String,
}

impl Default for KpiAggregatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(60),
            name: "kpi-aggregator".to_string(),
        }
    }
}

pub struct KpiAggregator {
    config: KpiAggregatorConfig,
    segments: Arc<dyn SegmentStore>,
    dlq: Arc<dyn DlqStore>,
    retries: Arc<dyn RetryStore>,
    kpis: Arc<dyn KpiStore>,
    configs: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    last_run: RwLock<HashMap<TenantId, DateTime<Utc>>>,
}

impl KpiAggregator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: KpiAggregatorConfig,
        segments: Arc<dyn SegmentStore>,
        dlq: Arc<dyn DlqStore>,
        retries: Arc<dyn RetryStore>,
        kpis: Arc<dyn KpiStore>,
        configs: Arc<dyn ConfigStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            segments,
            dlq,
            retries,
            kpis,
            configs,
            clock,
            last_run: RwLock::new(HashMap::new()),
        }
    }

    /// Compute and store one record per metric per active segment.
    pub fn recompute(
        &self,
        tenant_id: TenantId,
        period: KpiPeriod,
    ) -> DomainResult<Vec<KpiRecord>> {
        let config = self.configs.get(tenant_id)?;
        let thresholds = &config.escalation_thresholds;
        let now = self.clock.now();

        let messages = self.dlq.list(tenant_id, DlqFilter::default())?;
        let attempts = self.retries.list(tenant_id, Default::default())?;

        let mut records = Vec::new();
        for segment in self.segments.list(tenant_id)? {
            if !segment.is_active {
                continue;
            }

            let segment_messages: Vec<_> = messages
                .iter()
                .filter(|m| m.segment_id == Some(segment.id))
                .collect();
            let total = segment_messages.len();
            let resolved = segment_messages
                .iter()
                .filter(|m| m.status == MessageStatus::Resolved)
                .count();
            let dead = segment_messages
                .iter()
                .filter(|m| m.status == MessageStatus::Dead)
                .count();

            let collection_rate = ratio(resolved, total);
            let failure_rate = ratio(dead, total);

            let message_ids: HashSet<_> = segment_messages.iter().map(|m| m.id).collect();
            let durations: Vec<f64> = attempts
                .iter()
                .filter(|a| message_ids.contains(&a.message_id))
                .filter_map(|a| a.duration())
                .map(|d| d.num_milliseconds() as f64 / 3_600_000.0)
                .collect();
            let response_time = if durations.is_empty() {
                0.0
            } else {
                durations.iter().sum::<f64>() / durations.len() as f64
            };

            let measurements = [
                (
                    KpiMetric::CollectionRate,
                    collection_rate,
                    segment.kpis.target_collection_rate,
                ),
                (
                    KpiMetric::ResponseTime,
                    response_time,
                    segment.kpis.target_response_time,
                ),
                (
                    KpiMetric::FailureRate,
                    failure_rate,
                    segment.kpis.acceptable_failure_rate,
                ),
            ];

            for (metric, value, target) in measurements {
                let previous =
                    self.kpis
                        .latest_value(tenant_id, segment.id, metric, period)?;
                let record = self.kpis.insert(KpiRecord::measured(
                    tenant_id, segment.id, metric, value, target, period, now, thresholds,
                    previous,
                ))?;
                records.push(record);
            }
        }

        info!(
            tenant = %tenant_id,
            records = records.len(),
            period = ?period,
            "KPIs recomputed"
        );
        Ok(records)
    }

    fn run_due_tenants(&self) {
        let now = self.clock.now();
        let tenants = match self.segments.tenants() {
            Ok(tenants) => tenants,
            Err(error) => {
                warn!(%error, "failed to enumerate tenants");
                return;
            }
        };

        for tenant_id in tenants {
            let config = match self.configs.get(tenant_id) {
                Ok(config) => config,
                Err(error) => {
                    warn!(tenant = %tenant_id, %error, "failed to load config");
                    continue;
                }
            };
            if !config.enabled {
                continue;
            }

            let interval =
                chrono::Duration::minutes(i64::from(config.kpi_calculation_interval));
            let due = self
                .last_run
                .read()
                .unwrap()
                .get(&tenant_id)
                .is_none_or(|last| now - *last >= interval);
            if !due {
                continue;
            }

            if let Err(error) = self.recompute(tenant_id, KpiPeriod::Daily) {
                warn!(tenant = %tenant_id, %error, "KPI recomputation failed");
            }
            self.last_run.write().unwrap().insert(tenant_id, now);
        }
    }

    /// Start the background loop.
    pub fn spawn(self: &Arc<Self>) -> AggregatorHandle {
        let aggregator = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let name = self.config.name.clone();

        let join = tokio::spawn(async move {
            info!(name = %aggregator.config.name, "KPI aggregator started");
            let mut ticker = tokio::time::interval(aggregator.config.tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!(name = %aggregator.config.name, "KPI aggregator stopping");
                        break;
                    }
                    _ = ticker.tick() => aggregator.run_due_tenants(),
                }
            }
        });

        AggregatorHandle {
            name,
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Handle to stop a running aggregator loop.
pub struct AggregatorHandle {
    name: String,
    shutdown: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl AggregatorHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown.send(()).await;
        let _ = self.join.await;
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
