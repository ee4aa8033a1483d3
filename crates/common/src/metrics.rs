use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static CRUD_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_crud_operations_total",
        "CRUD operations handled by the catalog services",
        &["resource", "operation", "outcome"]
    )
    .expect("register crud_operations_total")
});

/// Count one finished operation; `outcome` is `ok` or the error kind.
pub fn record_operation(resource: &str, operation: &str, outcome: &str) {
    CRUD_OPERATIONS_TOTAL.with_label_values(&[resource, operation, outcome]).inc();
}

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("metrics encode error: {e}"))?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
