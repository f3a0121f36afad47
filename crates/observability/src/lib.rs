//! Process-wide tracing setup shared by the portal binaries.

/// Tracing configuration (filters, formatter).
pub mod tracing;

/// Initialize structured logging with the default `info` filter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::DEFAULT_FILTER);
}
