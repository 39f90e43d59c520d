//! Metrics and observability utilities
//!
//! Prometheus metrics with SLO-aligned histograms and standardized
//! naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Inkwell metrics
pub const METRICS_PREFIX: &str = "inkwell";

/// SLO-aligned histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms - P50 target
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Tenant resolution metrics
    describe_counter!(
        format!("{}_tenant_lookups_total", METRICS_PREFIX),
        Unit::Count,
        "Tenant lookups by outcome"
    );

    // Content metrics
    describe_counter!(
        format!("{}_posts_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total posts created"
    );

    describe_counter!(
        format!("{}_comments_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total comments submitted"
    );

    describe_counter!(
        format!("{}_likes_recorded_total", METRICS_PREFIX),
        Unit::Count,
        "Total likes recorded"
    );

    describe_counter!(
        format!("{}_blogs_registered_total", METRICS_PREFIX),
        Unit::Count,
        "Total blogs registered"
    );

    // Sidebar metrics
    describe_counter!(
        format!("{}_sidebar_query_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Sidebar queries that failed and were replaced with empty results"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a tenant lookup outcome ("hit", "miss", "platform")
pub fn record_tenant_lookup(outcome: &str) {
    counter!(
        format!("{}_tenant_lookups_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a created post
pub fn record_post_created(subdomain: &str) {
    counter!(
        format!("{}_posts_created_total", METRICS_PREFIX),
        "blog" => subdomain.to_string()
    )
    .increment(1);
}

/// Record a submitted comment
pub fn record_comment_submitted(subdomain: &str) {
    counter!(
        format!("{}_comments_submitted_total", METRICS_PREFIX),
        "blog" => subdomain.to_string()
    )
    .increment(1);
}

/// Record a recorded like
pub fn record_like(subdomain: &str) {
    counter!(
        format!("{}_likes_recorded_total", METRICS_PREFIX),
        "blog" => subdomain.to_string()
    )
    .increment(1);
}

/// Record a registered blog
pub fn record_blog_registered() {
    counter!(format!("{}_blogs_registered_total", METRICS_PREFIX)).increment(1);
}

/// Record a swallowed sidebar query failure
pub fn record_sidebar_failure(dataset: &str) {
    counter!(
        format!("{}_sidebar_query_failures_total", METRICS_PREFIX),
        "dataset" => dataset.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets() {
        // Verify buckets are sorted and contain SLO targets
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }

        // P50 target (50ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.050));
        // P99 target (250ms) should be in buckets
        assert!(LATENCY_BUCKETS.contains(&0.250));
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/posts/hello-world");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }
}
