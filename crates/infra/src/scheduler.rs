//! Retry scheduler: drives reprocessing of DLQ messages.
//!
//! Owns the backoff policy and the delivery seam. Every attempt is recorded
//! as a `RetryAttempt`; message status transitions go through the DLQ store's
//! atomic operations, so a concurrent retry of the same message loses the
//! claim instead of double-delivering.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use chrono::{DateTime, Utc};
use serde_json::json;

use solvendo_core::{DomainError, DomainResult, TenantId};
use solvendo_dunning::{
    Backoff, DlqIntake, DlqMessage, DlqMessageId, DunningConfig, MessageStatus, RetryAttempt,
};

use crate::clock::Clock;
use crate::delivery::{DeliveryChannel, DeliveryError};
use crate::events::EngineEvent;
use crate::stores::{ConfigStore, DlqStore, RetryStore, SegmentStore};

#[derive(Debug, Clone)]
pub struct RetrySchedulerConfig {
    /// Cadence of the background pass.
    pub poll_interval: Duration,
    /// Per-attempt delivery timeout; a timeout counts as a retryable failure.
    pub attempt_timeout: Duration,
    /// +/- fraction of jitter applied to the backoff ladder.
    pub jitter: f64,
    /// Name for logging.
    pub name: String,
}

impl Default for RetrySchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5 * 60),
            attempt_timeout: Duration::from_secs(30),
            jitter: 0.1,
            name: "retry-scheduler".to_string(),
        }
    }
}

impl RetrySchedulerConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }
}

/// Counts for one processing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    pub purged: usize,
}

impl ProcessReport {
    fn absorb(&mut self, other: ProcessReport) {
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.dead_lettered += other.dead_lettered;
        self.purged += other.purged;
    }
}

enum AttemptOutcome {
    Delivered,
    Retryable,
    Exhausted,
}

pub struct RetryScheduler {
    config: RetrySchedulerConfig,
    segments: Arc<dyn SegmentStore>,
    dlq: Arc<dyn DlqStore>,
    retries: Arc<dyn RetryStore>,
    configs: Arc<dyn ConfigStore>,
    channel: Arc<dyn DeliveryChannel>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<EngineEvent>,
}

impl RetryScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RetrySchedulerConfig,
        segments: Arc<dyn SegmentStore>,
        dlq: Arc<dyn DlqStore>,
        retries: Arc<dyn RetryStore>,
        configs: Arc<dyn ConfigStore>,
        channel: Arc<dyn DeliveryChannel>,
        clock: Arc<dyn Clock>,
        events: broadcast::Sender<EngineEvent>,
    ) -> Self {
        Self {
            config,
            segments,
            dlq,
            retries,
            configs,
            channel,
            clock,
            events,
        }
    }

    fn backoff(&self, config: &DunningConfig) -> Backoff {
        Backoff::new(config.retry_intervals.clone(), self.config.jitter)
    }

    fn publish(&self, tenant_id: TenantId, topic: &str, payload: serde_json::Value) {
        let _ = self.events.send(EngineEvent::new(
            tenant_id,
            topic,
            payload,
            self.clock.now(),
        ));
    }

    /// Intake a failed delivery into the DLQ.
    ///
    /// The retry budget comes from the owning segment's strategy when the
    /// message is attributed, otherwise from the tenant config.
    pub fn add_to_dlq(&self, tenant_id: TenantId, intake: DlqIntake) -> DomainResult<DlqMessage> {
        let config = self.configs.get(tenant_id)?;
        let max_retries = match intake.segment_id {
            Some(segment_id) => self
                .segments
                .get(tenant_id, segment_id)?
                .ok_or_else(|| DomainError::validation("segmentId does not exist"))?
                .strategy
                .max_retries,
            None => config.max_retries,
        };

        let now = self.clock.now();
        let mut message = DlqMessage::new(tenant_id, intake, max_retries, now, now)?;
        message.next_retry_at = self.backoff(&config).schedule_from(now, message.id, 0);
        let message = self.dlq.insert(message)?;

        info!(
            message_id = %message.id,
            queue = %message.queue_name,
            failure_reason = %message.failure_reason,
            priority = ?message.priority,
            "message added to DLQ"
        );
        self.publish(
            tenant_id,
            "dlq.message_added",
            json!({ "id": message.id, "queueName": message.queue_name }),
        );
        Ok(message)
    }

    /// Run one retry attempt for a message, recording the result.
    pub async fn retry_message(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
    ) -> DomainResult<RetryAttempt> {
        self.run_retry(tenant_id, id).await.map(|(attempt, _)| attempt)
    }

    async fn run_retry(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
    ) -> DomainResult<(RetryAttempt, AttemptOutcome)> {
        let config = self.configs.get(tenant_id)?;
        let message = self
            .dlq
            .get(tenant_id, id)?
            .ok_or(DomainError::NotFound)?;

        if message.status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "message is {:?} and cannot be retried",
                message.status
            )));
        }

        let now = self.clock.now();

        // Budget exhausted: park the message, still record a terminal failed
        // attempt so the sequence stays gapless.
        if message.status == MessageStatus::Pending && message.budget_exhausted() {
            let dead = self.dlq.mark_dead(tenant_id, id, now)?;
            let mut attempt =
                RetryAttempt::scheduled(tenant_id, id, message.retry_count + 1, message.next_retry_at);
            attempt.fail(now, "retry budget exhausted");
            let attempt = self.retries.insert(attempt)?;

            warn!(
                message_id = %id,
                retry_count = dead.retry_count,
                max_retries = dead.max_retries,
                "retry budget exhausted, message dead-lettered"
            );
            self.publish(tenant_id, "dlq.message_dead", json!({ "id": id }));
            return Ok((attempt, AttemptOutcome::Exhausted));
        }

        let backoff = self.backoff(&config);
        let schedule = |count: u32| backoff.schedule_from(now, id, count);
        let (claimed, attempt_number) =
            self.dlq.claim_for_retry(tenant_id, id, now, &schedule)?;

        let mut attempt =
            RetryAttempt::scheduled(tenant_id, id, attempt_number, message.next_retry_at);
        attempt.start(now);

        debug!(
            message_id = %id,
            attempt = attempt_number,
            "running delivery attempt"
        );

        let delivery = tokio::time::timeout(
            self.config.attempt_timeout,
            self.channel.deliver(&claimed),
        )
        .await;
        let outcome = match delivery {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout(self.config.attempt_timeout)),
        };

        let completed_at = self.clock.now();
        let outcome = match outcome {
            Ok(()) => {
                self.dlq.record_success(tenant_id, id, completed_at)?;
                attempt.succeed(completed_at);
                info!(message_id = %id, attempt = attempt_number, "delivery attempt succeeded");
                self.publish(
                    tenant_id,
                    "dlq.retry_succeeded",
                    json!({ "id": id, "attemptNumber": attempt_number }),
                );
                AttemptOutcome::Delivered
            }
            Err(error) => {
                self.dlq.record_failure(tenant_id, id, completed_at)?;
                attempt.fail(completed_at, error.to_string());
                warn!(
                    message_id = %id,
                    attempt = attempt_number,
                    error = %error,
                    "delivery attempt failed"
                );
                self.publish(
                    tenant_id,
                    "dlq.retry_failed",
                    json!({ "id": id, "attemptNumber": attempt_number }),
                );
                AttemptOutcome::Retryable
            }
        };

        let attempt = self.retries.insert(attempt)?;
        Ok((attempt, outcome))
    }

    /// Operator resolution.
    pub fn resolve_message(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
    ) -> DomainResult<DlqMessage> {
        let message = self.dlq.resolve(tenant_id, id)?;
        info!(message_id = %id, "message resolved");
        self.publish(tenant_id, "dlq.message_resolved", json!({ "id": id }));
        Ok(message)
    }

    /// Deliberate `dead -> pending` with a fresh budget from the tenant config.
    pub fn requeue_message(
        &self,
        tenant_id: TenantId,
        id: DlqMessageId,
    ) -> DomainResult<DlqMessage> {
        let config = self.configs.get(tenant_id)?;
        let now = self.clock.now();
        let next_retry_at = self.backoff(&config).schedule_from(now, id, 0);
        let message = self
            .dlq
            .requeue(tenant_id, id, config.max_retries, next_retry_at)?;
        info!(message_id = %id, "dead message requeued");
        self.publish(tenant_id, "dlq.message_requeued", json!({ "id": id }));
        Ok(message)
    }

    /// One pass for a tenant: purge expired terminal messages, then retry
    /// everything that is due.
    pub async fn process_due(
        &self,
        tenant_id: TenantId,
        now: DateTime<Utc>,
    ) -> DomainResult<ProcessReport> {
        let config = self.configs.get(tenant_id)?;
        let mut report = ProcessReport::default();

        let cutoff = now - chrono::Duration::days(i64::from(config.dlq_retention_days));
        report.purged = self.dlq.purge_expired(tenant_id, cutoff)?;

        for id in self.dlq.due(tenant_id, now)? {
            match self.run_retry(tenant_id, id).await {
                Ok((_, AttemptOutcome::Delivered)) => {
                    report.processed += 1;
                    report.succeeded += 1;
                }
                Ok((_, AttemptOutcome::Retryable)) => {
                    report.processed += 1;
                    report.failed += 1;
                }
                Ok((_, AttemptOutcome::Exhausted)) => {
                    report.processed += 1;
                    report.dead_lettered += 1;
                }
                // Lost the claim to a concurrent retry; nothing to do.
                Err(DomainError::Conflict(reason)) => {
                    debug!(message_id = %id, %reason, "skipping contested message");
                }
                Err(error) => {
                    warn!(message_id = %id, %error, "failed to process due message");
                }
            }
        }

        Ok(report)
    }

    /// One pass across every tenant with messages, honoring per-tenant
    /// `enabled`.
    pub async fn process_all(&self) -> ProcessReport {
        let now = self.clock.now();
        let mut report = ProcessReport::default();

        let tenants = match self.dlq.tenants() {
            Ok(tenants) => tenants,
            Err(error) => {
                warn!(%error, "failed to enumerate tenants");
                return report;
            }
        };

        for tenant_id in tenants {
            let enabled = self
                .configs
                .get(tenant_id)
                .map(|c| c.enabled)
                .unwrap_or(false);
            if !enabled {
                continue;
            }
            match self.process_due(tenant_id, now).await {
                Ok(tenant_report) => report.absorb(tenant_report),
                Err(error) => warn!(tenant = %tenant_id, %error, "processing pass failed"),
            }
        }

        report
    }

    /// Start the background loop. Ticks every `poll_interval`.
    pub fn spawn(self: &Arc<Self>) -> SchedulerHandle {
        let scheduler = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let name = self.config.name.clone();

        let join = tokio::spawn(async move {
            info!(name = %scheduler.config.name, "retry scheduler started");
            let mut ticker = tokio::time::interval(scheduler.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the immediate first tick.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!(name = %scheduler.config.name, "retry scheduler stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let report = scheduler.process_all().await;
                        if report.processed > 0 || report.purged > 0 {
                            info!(
                                processed = report.processed,
                                succeeded = report.succeeded,
                                failed = report.failed,
                                dead_lettered = report.dead_lettered,
                                purged = report.purged,
                                "processing pass complete"
                            );
                        }
                    }
                }
            }
        });

        SchedulerHandle {
            name,
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Handle to stop a running scheduler loop.
pub struct SchedulerHandle {
    name: String,
    shutdown: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request graceful shutdown and wait for the loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(()).await;
        let _ = self.join.await;
    }
}
