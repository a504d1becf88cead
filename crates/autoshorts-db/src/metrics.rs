//! Database metrics collection.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total queries by operation and outcome.
    pub const QUERIES_TOTAL: &str = "db_queries_total";

    /// Query latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "db_query_latency_seconds";
}

/// Record metrics for a completed query.
pub fn record_query(operation: &str, success: bool, latency_ms: f64) {
    let status = if success { "ok" } else { "error" };

    counter!(
        names::QUERIES_TOTAL,
        "operation" => operation.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::QUERIES_TOTAL.contains("queries"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_query("video_exists", true, 1.5);
        record_query("video_exists", false, 3.0);
    }
}
