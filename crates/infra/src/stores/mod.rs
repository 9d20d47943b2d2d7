//! Store traits and in-memory implementations.
//!
//! Everything is tenant-keyed; a store never hands one tenant's rows to
//! another. The in-memory implementations back tests and the dev server; a
//! SQL-backed set can slot in behind the same traits.

mod config;
mod dlq;
mod kpi;
mod retry;
mod segment;

pub use config::{ConfigStore, InMemoryConfigStore};
pub use dlq::{DlqFilter, DlqStore, InMemoryDlqStore};
pub use kpi::{InMemoryKpiStore, KpiFilter, KpiStore};
pub use retry::{InMemoryRetryStore, RetryFilter, RetryStore};
pub use segment::{InMemorySegmentStore, SegmentStore};
