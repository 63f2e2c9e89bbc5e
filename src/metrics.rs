use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("cec_gateway_requests_total", "Total number of HTTP requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "cec_gateway_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref CEC_COMMANDS_TOTAL: Counter = register_counter!(
        "cec_gateway_cec_commands_total",
        "CEC commands handed to the worker"
    )
    .unwrap();
    pub static ref CEC_FAILURES_TOTAL: Counter = register_counter!(
        "cec_gateway_cec_failures_total",
        "CEC commands that ended in an error"
    )
    .unwrap();
    pub static ref CEC_LATENCY: Histogram = register_histogram!(
        "cec_gateway_cec_latency_seconds",
        "cec-client invocation latency in seconds"
    )
    .unwrap();
}
