//! Tracing/logging initialization.
//!
//! Structured JSON logs with an env-driven filter. Correlation IDs and OTLP
//! export can layer on here later without touching call sites.

use tracing_subscriber::EnvFilter;

/// Initialize with `info` as the fallback filter.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default("info");
}

/// Initialize with caller-chosen fallback directives.
///
/// `RUST_LOG` still wins when set; `directives` apply otherwise. Binaries use
/// this to turn their own crates up without drowning in dependency noise.
pub fn init_with_default(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}
