use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec, register_gauge,
    register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("employee_api_requests_total", "Total number of rate-limited requests seen").unwrap();
    pub static ref RATE_LIMITED_TOTAL: CounterVec = register_counter_vec!(
        "employee_api_rate_limited_total",
        "Requests rejected by the rate limiter",
        &["route"]
    )
    .unwrap();
    pub static ref QUERY_LATENCY: Histogram = register_histogram!(
        "employee_api_query_latency_seconds",
        "Store query latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("employee_api_tracked_clients", "Client identifiers held by the rate limiter").unwrap();
}
