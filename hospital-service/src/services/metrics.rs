//! Prometheus metrics for hospital-service.

use once_cell::sync::Lazy;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec, TextEncoder};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use service_core::middleware::metrics::init_http_metrics;

/// Committed bill counter by source (draft, request, csv, image, upstream).
pub static BILLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "hospital_bills_total",
        "Total number of committed bills by source",
        &["source"]
    )
    .expect("Failed to register bills_total")
});

/// Total billed amount.
pub static BILL_AMOUNT_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "hospital_bill_amount_total",
        "Total billed amount across committed bills"
    )
    .expect("Failed to register bill_amount_total")
});

/// Registered patient counter.
pub static PATIENTS_REGISTERED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "hospital_patients_registered_total",
        "Total number of registered patients"
    )
    .expect("Failed to register patients_registered_total")
});

/// Record one committed bill.
pub fn observe_bill(source: &str, total: Decimal) {
    BILLS_TOTAL.with_label_values(&[source]).inc();
    if let Some(amount) = total.to_f64() {
        BILL_AMOUNT_TOTAL.inc_by(amount.max(0.0));
    }
}

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    init_http_metrics();
    Lazy::force(&BILLS_TOTAL);
    Lazy::force(&BILL_AMOUNT_TOTAL);
    Lazy::force(&PATIENTS_REGISTERED_TOTAL);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
