//! Tracing/logging setup shared by the Solvendo services.

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Initialize process-wide observability with `info` defaults.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with caller-chosen fallback filter directives.
pub fn init_with_default(directives: &str) {
    tracing::init_with_default(directives);
}
