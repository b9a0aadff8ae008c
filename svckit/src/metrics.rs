use lazy_static::lazy_static;
use prometheus::core::Collector;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    pub static ref API_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "queue_api_request_duration_seconds",
        "Queue API request duration in seconds",
        &["method", "outcome"]
    ).expect("metric can be registered");

    pub static ref API_REQUEST_COUNTER: IntCounterVec = register_int_counter_vec!(
        "queue_api_requests_total",
        "Total number of queue API requests",
        &["method", "outcome"]
    ).expect("metric can be registered");
}

/// Outcome label for a finished request.
pub fn outcome_label(status: Option<u16>) -> &'static str {
    match status {
        Some(200..=299) => "2xx",
        Some(400..=499) => "4xx",
        Some(500..=599) => "5xx",
        Some(_) => "other",
        None => "network",
    }
}

pub fn record_request(method: &str, status: Option<u16>, duration: f64) {
    let outcome = outcome_label(status);
    API_REQUEST_DURATION
        .with_label_values(&[method, outcome])
        .observe(duration);
    API_REQUEST_COUNTER
        .with_label_values(&[method, outcome])
        .inc();
}

/// Succeeded and failed request counts since start, summed over methods.
pub fn request_totals() -> (u64, u64) {
    let mut ok = 0;
    let mut failed = 0;
    for family in API_REQUEST_COUNTER.collect() {
        for metric in family.get_metric() {
            let value = metric.get_counter().get_value() as u64;
            let is_ok = metric
                .get_label()
                .iter()
                .any(|label| label.get_name() == "outcome" && label.get_value() == "2xx");
            if is_ok {
                ok += value;
            } else {
                failed += value;
            }
        }
    }
    (ok, failed)
}
