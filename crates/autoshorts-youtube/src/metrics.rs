//! Request metrics for YouTube-facing clients.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total upstream requests by service, operation and status.
    pub const REQUESTS_TOTAL: &str = "youtube_requests_total";

    /// Request latency in seconds by service and operation.
    pub const LATENCY_SECONDS: &str = "youtube_latency_seconds";
}

/// Record metrics for a completed upstream request.
pub fn record_request(service: &'static str, operation: &'static str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "service" => service,
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "service" => service,
        "operation" => operation
    )
    .record(latency_ms / 1000.0);
}
