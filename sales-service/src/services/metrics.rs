//! Prometheus metrics for sales-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

/// Counter for sale creation outcomes.
pub static SALES_CREATED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_created_total",
        "Total number of sale creation attempts",
        &["outcome"]
    )
    .expect("Failed to register SALES_CREATED")
});

/// Counter for stock adjustment calls against the inventory collaborator.
pub static STOCK_ADJUSTMENTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_stock_adjustments_total",
        "Total number of inventory stock adjustment calls",
        &["outcome"]
    )
    .expect("Failed to register STOCK_ADJUSTMENTS")
});

/// Counter for compensating re-increments after a failed fulfillment.
pub static STOCK_COMPENSATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_stock_compensations_total",
        "Total number of compensating stock re-increments",
        &["outcome"]
    )
    .expect("Failed to register STOCK_COMPENSATIONS")
});

/// Counter for best-effort side effects issued after a successful sale.
pub static SIDE_EFFECTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_side_effects_total",
        "Outcomes of best-effort side effects",
        &["effect", "outcome"]
    )
    .expect("Failed to register SIDE_EFFECTS")
});

/// Histogram for database query duration.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "sales_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Histogram for collaborator HTTP request duration.
pub static COLLABORATOR_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "sales_collaborator_request_duration_seconds",
        "Collaborator HTTP request duration in seconds",
        &["collaborator"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register COLLABORATOR_REQUEST_DURATION")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&SALES_CREATED);
    Lazy::force(&STOCK_ADJUSTMENTS);
    Lazy::force(&STOCK_COMPENSATIONS);
    Lazy::force(&SIDE_EFFECTS);
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

/// Record a sale creation outcome.
pub fn record_sale_created(outcome: &str) {
    SALES_CREATED.with_label_values(&[outcome]).inc();
}

/// Record a stock adjustment outcome.
pub fn record_stock_adjustment(outcome: &str) {
    STOCK_ADJUSTMENTS.with_label_values(&[outcome]).inc();
}

/// Record a compensating re-increment outcome.
pub fn record_stock_compensation(outcome: &str) {
    STOCK_COMPENSATIONS.with_label_values(&[outcome]).inc();
}

/// Record a best-effort side effect outcome.
pub fn record_side_effect(effect: &str, outcome: &str) {
    SIDE_EFFECTS.with_label_values(&[effect, outcome]).inc();
}
