//! `solvendo-dunning` — pure dunning domain.
//!
//! Segments, the dead-letter-queue message state machine, retry records with
//! backoff policy, KPI records, and the engine configuration. No IO, no
//! clocks, no locks: callers pass `now` in and get values back.

pub mod config;
pub mod kpi;
pub mod message;
pub mod retry;
pub mod segment;

pub use config::{ConfigPatch, DunningConfig, EscalationThresholds};
pub use kpi::{KpiId, KpiMetric, KpiPeriod, KpiRecord, KpiStatus, KpiTrend};
pub use message::{DlqIntake, DlqMessage, DlqMessageId, MessageStatus, MessageType};
pub use retry::{Backoff, RetryAttempt, RetryId, RetryStatus, RetryStrategy};
pub use segment::{
    AmountRange, Channel, CustomerType, DayRange, Priority, RiskLevel, Segment, SegmentCriteria,
    SegmentDraft, SegmentId, SegmentKpiTargets, SegmentPatch, SegmentStrategy,
};
