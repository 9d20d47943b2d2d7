//! Shared application state: stores, background workers, realtime fan-out.

use std::convert::Infallible;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::{info, warn};

use solvendo_core::TenantId;
use solvendo_infra::aggregator::{AggregatorHandle, KpiAggregator, KpiAggregatorConfig};
use solvendo_infra::clock::{Clock, SystemClock};
use solvendo_infra::delivery::DeliveryChannel;
use solvendo_infra::events::EngineEvent;
use solvendo_infra::scheduler::{RetryScheduler, RetrySchedulerConfig, SchedulerHandle};
use solvendo_infra::seed::seed_default_segments;
use solvendo_infra::stores::{
    ConfigStore, DlqStore, InMemoryConfigStore, InMemoryDlqStore, InMemoryKpiStore,
    InMemoryRetryStore, InMemorySegmentStore, KpiStore, RetryStore, SegmentStore,
};

const REALTIME_CAPACITY: usize = 256;
const SEED_TENANT_VAR: &str = "SOLVENDO_SEED_TENANT";

/// Everything the routes need, wired once at startup.
///
/// Owns the worker handles: dropping them shuts the background loops down, so
/// they live exactly as long as the app state does.
pub struct AppServices {
    segments: Arc<dyn SegmentStore>,
    dlq: Arc<dyn DlqStore>,
    retries: Arc<dyn RetryStore>,
    kpis: Arc<dyn KpiStore>,
    configs: Arc<dyn ConfigStore>,
    scheduler: Arc<RetryScheduler>,
    aggregator: Arc<KpiAggregator>,
    clock: Arc<dyn Clock>,
    realtime_tx: broadcast::Sender<EngineEvent>,
    _scheduler_handle: SchedulerHandle,
    _aggregator_handle: AggregatorHandle,
}

impl AppServices {
    pub fn segments(&self) -> &dyn SegmentStore {
        self.segments.as_ref()
    }

    pub fn dlq(&self) -> &dyn DlqStore {
        self.dlq.as_ref()
    }

    pub fn retries(&self) -> &dyn RetryStore {
        self.retries.as_ref()
    }

    pub fn kpis(&self) -> &dyn KpiStore {
        self.kpis.as_ref()
    }

    pub fn configs(&self) -> &dyn ConfigStore {
        self.configs.as_ref()
    }

    pub fn scheduler(&self) -> &RetryScheduler {
        &self.scheduler
    }

    pub fn aggregator(&self) -> &KpiAggregator {
        &self.aggregator
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn publish(&self, tenant_id: TenantId, topic: &str, payload: serde_json::Value) {
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self
            .realtime_tx
            .send(EngineEvent::new(tenant_id, topic, payload, self.clock.now()));
    }
}

/// Wire the stores, workers, and realtime channel.
///
/// Must run inside a tokio runtime (spawns the scheduler and aggregator
/// loops). The delivery channel is injected so tests can script outcomes.
pub fn build_services(channel: Arc<dyn DeliveryChannel>) -> AppServices {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let segments: Arc<dyn SegmentStore> = InMemorySegmentStore::arc();
    let dlq: Arc<dyn DlqStore> = InMemoryDlqStore::arc();
    let retries: Arc<dyn RetryStore> = InMemoryRetryStore::arc();
    let kpis: Arc<dyn KpiStore> = InMemoryKpiStore::arc();
    let configs: Arc<dyn ConfigStore> = InMemoryConfigStore::arc();

    let (realtime_tx, _) = broadcast::channel(REALTIME_CAPACITY);

    let scheduler = Arc::new(RetryScheduler::new(
        RetrySchedulerConfig::default(),
        Arc::clone(&segments),
        Arc::clone(&dlq),
        Arc::clone(&retries),
        Arc::clone(&configs),
        channel,
        Arc::clone(&clock),
        realtime_tx.clone(),
    ));
    let aggregator = Arc::new(KpiAggregator::new(
        KpiAggregatorConfig::default(),
        Arc::clone(&segments),
        Arc::clone(&dlq),
        Arc::clone(&retries),
        Arc::clone(&kpis),
        Arc::clone(&configs),
        Arc::clone(&clock),
    ));

    let scheduler_handle = scheduler.spawn();
    let aggregator_handle = aggregator.spawn();

    seed_from_env(segments.as_ref(), clock.as_ref());

    AppServices {
        segments,
        dlq,
        retries,
        kpis,
        configs,
        scheduler,
        aggregator,
        clock,
        realtime_tx,
        _scheduler_handle: scheduler_handle,
        _aggregator_handle: aggregator_handle,
    }
}

/// Optional dev convenience: seed the stock segments for one tenant.
fn seed_from_env(segments: &dyn SegmentStore, clock: &dyn Clock) {
    let Ok(raw) = env::var(SEED_TENANT_VAR) else {
        return;
    };
    let tenant_id: TenantId = match raw.parse() {
        Ok(tenant_id) => tenant_id,
        Err(error) => {
            warn!(%error, "{SEED_TENANT_VAR} is not a valid tenant id");
            return;
        }
    };
    match seed_default_segments(segments, tenant_id, clock.now()) {
        Ok(seeded) => info!(%tenant_id, count = seeded.len(), "seeded default segments"),
        Err(error) => warn!(%error, "failed to seed default segments"),
    }
}

/// Live event stream for one tenant; other tenants' events are filtered out.
///
/// The stream owns its subscription; it must not capture the `services`
/// borrow, hence the precise `use<>` capture bound.
pub fn tenant_sse_stream(
    services: &AppServices,
    tenant_id: TenantId,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>> + use<>> {
    let rx = services.realtime_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |event| {
        let event = event.ok()?;
        if event.tenant_id != tenant_id {
            return None;
        }
        let topic = event.topic.clone();
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok(SseEvent::default().event(topic).data(data)))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
