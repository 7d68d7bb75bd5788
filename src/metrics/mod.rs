//! Metrics collection and exposition for Prometheus.
//!
//! The registry lives in [`Metrics`]; [`track_http_metrics`] feeds it one
//! observation per completed HTTP request.

mod middleware;
mod recorder;

pub use middleware::{track_http_metrics, InFlightRequest};
pub use recorder::{
    Metrics, MetricsError, MetricsRecorder, HTTP_DURATION_BUCKETS_MS, HTTP_REQUEST_LABELS,
};
