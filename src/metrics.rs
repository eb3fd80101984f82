/// Metrics for guest credential resolution
///
/// Provides Prometheus-compatible counters for:
/// - Credential cache lookups by outcome
/// - Federation service requests by operation and status
///
/// Counters live in the default Prometheus registry. Embedding applications
/// scrape them through their own exporter or `gather_metrics`; the
/// `guest-credentials` binary prints them to stderr when
/// `GUEST_CREDENTIALS_PRINT_METRICS` is set.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Credential cache lookups by outcome (hit, absent, unreadable, malformed, expired)
    pub static ref CREDENTIAL_CACHE_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "credential_cache_lookups_total",
        "Total number of credential cache lookups",
        &["outcome"]
    )
    .unwrap();

    /// Federation requests by operation and status
    pub static ref FEDERATION_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "federation_requests_total",
        "Total number of identity federation requests",
        &["operation", "status"]
    )
    .unwrap();
}

/// Record the outcome of a credential cache lookup
pub fn record_cache_lookup(outcome: &str) {
    CREDENTIAL_CACHE_LOOKUPS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

/// Record a federation request
pub fn record_federation_request(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    FEDERATION_REQUESTS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

/// Render all registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
