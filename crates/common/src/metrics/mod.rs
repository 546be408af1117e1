//! Metrics and observability utilities
//!
//! Provides Prometheus metric descriptions and recording helpers
//! with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all StudyHub metrics
pub const METRICS_PREFIX: &str = "studyhub";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, // 5ms
    0.010, // 10ms
    0.025, // 25ms
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
    10.00, // 10s
];

/// Buckets for model latency (generation is slow)
pub const MODEL_BUCKETS: &[f64] = &[
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.000, // 2s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
    60.00, // 60s
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

    // Form action metrics
    describe_counter!(
        format!("{}_actions_total", METRICS_PREFIX),
        Unit::Count,
        "Form actions by outcome (success, invalid, failed)"
    );

    // Model metrics
    describe_counter!(
        format!("{}_model_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total model API requests"
    );

    describe_histogram!(
        format!("{}_model_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Model generation latency in seconds"
    );

    describe_counter!(
        format!("{}_model_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total model API errors"
    );

    // Storage metrics
    describe_counter!(
        format!("{}_uploads_total", METRICS_PREFIX),
        Unit::Count,
        "Objects written to the blob store"
    );

    describe_counter!(
        format!("{}_upload_bytes_total", METRICS_PREFIX),
        Unit::Bytes,
        "Bytes written to the blob store"
    );

    describe_counter!(
        format!("{}_documents_written_total", METRICS_PREFIX),
        Unit::Count,
        "Records appended to a document collection"
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

/// Outcome label of a form action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Invalid,
    Failed,
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOutcome::Success => "success",
            ActionOutcome::Invalid => "invalid",
            ActionOutcome::Failed => "failed",
        }
    }
}

/// Helper to record form action outcomes
pub fn record_action(action: &str, outcome: ActionOutcome) {
    counter!(
        format!("{}_actions_total", METRICS_PREFIX),
        "action" => action.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Helper to record model metrics
pub fn record_model_call(duration_secs: f64, prompt: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_model_requests_total", METRICS_PREFIX),
        "prompt" => prompt.to_string(),
        "status" => status
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_model_duration_seconds", METRICS_PREFIX),
            "prompt" => prompt.to_string()
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_model_errors_total", METRICS_PREFIX),
            "prompt" => prompt.to_string()
        )
        .increment(1);
    }
}

/// Helper to record blob uploads
pub fn record_upload(bucket: &str, bytes: usize) {
    counter!(
        format!("{}_uploads_total", METRICS_PREFIX),
        "bucket" => bucket.to_string()
    )
    .increment(1);

    counter!(
        format!("{}_upload_bytes_total", METRICS_PREFIX),
        "bucket" => bucket.to_string()
    )
    .increment(bytes as u64);
}

/// Helper to record document collection writes
pub fn record_document_write(collection: &str) {
    counter!(
        format!("{}_documents_written_total", METRICS_PREFIX),
        "collection" => collection.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_sorted() {
        for buckets in [LATENCY_BUCKETS, MODEL_BUCKETS] {
            let mut prev = 0.0;
            for &bucket in buckets {
                assert!(bucket > prev);
                prev = bucket;
            }
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every helper must be a no-op
        let metrics = RequestMetrics::start("POST", "/api/notes");
        metrics.finish(200);
        record_action("add_note", ActionOutcome::Invalid);
        record_model_call(0.3, "summarize_notes", false);
        record_upload("notes", 1024);
        record_document_write("notes");
    }
}
