//! Sync operation metrics.
//!
//! # Metrics
//! - `config_sync_operations_total` (counter): sync calls by `operation`
//!   (install, update, uninstall) and `outcome` (created, updated,
//!   unchanged, deleted, unavailable, failed)

/// Count one finished sync operation.
pub fn record_operation(operation: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "config_sync_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
