//! Prometheus metrics for delivery-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

/// Counter for delivery operations.
pub static DELIVERY_OPERATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "delivery_operations_total",
        "Total number of delivery operations",
        &["operation", "outcome"]
    )
    .expect("Failed to register DELIVERY_OPERATIONS")
});

/// Counter for enrichment lookups against the collaborators.
pub static ENRICHMENT_LOOKUPS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "delivery_enrichment_lookups_total",
        "Outcomes of enrichment lookups per source",
        &["source", "outcome"]
    )
    .expect("Failed to register ENRICHMENT_LOOKUPS")
});

/// Histogram for database query duration.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "delivery_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Histogram for collaborator HTTP request duration.
pub static COLLABORATOR_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "delivery_collaborator_request_duration_seconds",
        "Collaborator HTTP request duration in seconds",
        &["collaborator"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register COLLABORATOR_REQUEST_DURATION")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DELIVERY_OPERATIONS);
    Lazy::force(&ENRICHMENT_LOOKUPS);
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&COLLABORATOR_REQUEST_DURATION);
}

/// Get all metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Record a delivery operation outcome.
pub fn record_delivery_operation(operation: &str, outcome: &str) {
    DELIVERY_OPERATIONS
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Record an enrichment lookup outcome.
pub fn record_enrichment_lookup(source: &str, outcome: &str) {
    ENRICHMENT_LOOKUPS
        .with_label_values(&[source, outcome])
        .inc();
}
