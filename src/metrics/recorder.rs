//! Metrics recording implementation using Prometheus.

use prometheus::core::Collector;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::MetricsConfig;

/// Upper bounds of the request duration histogram, in milliseconds.
pub const HTTP_DURATION_BUCKETS_MS: [f64; 6] = [1.0, 5.0, 15.0, 50.0, 100.0, 500.0];

/// Label names shared by the HTTP counter and histogram.
pub const HTTP_REQUEST_LABELS: [&str; 3] = ["method", "route", "status_code"];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records one completed HTTP request: a counter increment and a duration observation.
    fn record_http_request(&self, method: &str, route: &str, status_code: u16, duration_ms: f64);
}

/// Prometheus metrics collector.
///
/// One instance per process, created at startup and shared through `AppState`.
/// Cloning is cheap: every field is reference counted.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // HTTP metrics
    http_requests_total: CounterVec,
    http_request_duration_ms: HistogramVec,
}

impl Metrics {
    /// Creates a registry carrying the `app` label and registers the HTTP series.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric name collides or a label name is invalid.
    pub fn new(config: &MetricsConfig) -> Result<Self, MetricsError> {
        let mut default_labels = HashMap::new();
        default_labels.insert("app".to_string(), config.app_label.clone());
        let registry = Arc::new(Registry::new_custom(None, Some(default_labels))?);

        let http_requests_total = register_counter_vec_with_registry!(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &HTTP_REQUEST_LABELS,
            registry.clone()
        )?;

        let http_request_duration_ms = register_histogram_vec_with_registry!(
            "http_request_duration_ms",
            "Duration of HTTP requests in ms",
            &HTTP_REQUEST_LABELS,
            HTTP_DURATION_BUCKETS_MS.to_vec(),
            registry.clone()
        )?;

        let metrics = Metrics {
            registry,
            http_requests_total,
            http_request_duration_ms,
        };

        if config.process_metrics {
            metrics.register_process_collector()?;
        }

        Ok(metrics)
    }

    /// Adds a collector to the registry. Fails if any of its names is already taken.
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<(), MetricsError> {
        self.registry.register(collector)?;
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn register_process_collector(&self) -> Result<(), MetricsError> {
        use prometheus::process_collector::ProcessCollector;
        self.register(Box::new(ProcessCollector::for_self()))
    }

    #[cfg(not(target_os = "linux"))]
    fn register_process_collector(&self) -> Result<(), MetricsError> {
        tracing::debug!("Process metrics are only collected on Linux.");
        Ok(())
    }

    /// The content type of [`Metrics::render`] output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Renders all metrics in Prometheus text format.
    ///
    /// Families come out sorted by name, so the output is deterministic for
    /// a given set of values.
    pub fn render(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }
}

impl MetricsRecorder for Metrics {
    fn record_http_request(&self, method: &str, route: &str, status_code: u16, duration_ms: f64) {
        let status = status_code.to_string();
        let labels = [method, route, status.as_str()];
        self.http_request_duration_ms
            .with_label_values(&labels)
            .observe(duration_ms);
        self.http_requests_total.with_label_values(&labels).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::IntCounter;

    /// Value of the `name` sample whose labels include all of `labels`, in any order.
    fn sample(text: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        text.lines()
            .filter(|line| line.starts_with(&format!("{}{{", name)))
            .find(|line| {
                labels
                    .iter()
                    .all(|(k, v)| line.contains(&format!("{}=\"{}\"", k, v)))
            })
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|value| value.parse().ok())
    }

    fn test_config() -> MetricsConfig {
        MetricsConfig {
            app_label: "test-app".to_string(),
            process_metrics: false,
        }
    }

    #[test]
    fn render_contains_http_series_with_buckets() {
        let metrics = Metrics::new(&test_config()).unwrap();
        metrics.record_http_request("GET", "/items", 200, 3.5);

        let text = metrics.render().unwrap();
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains("# TYPE http_request_duration_ms histogram"));
        for le in ["1", "5", "15", "50", "100", "500", "+Inf"] {
            assert!(
                text.contains(&format!("le=\"{}\"", le)),
                "missing bucket le={} in:\n{}",
                le,
                text
            );
        }
        let labels = [
            ("app", "test-app"),
            ("method", "GET"),
            ("route", "/items"),
            ("status_code", "200"),
        ];
        assert_eq!(sample(&text, "http_requests_total", &labels), Some(1.0));
    }

    #[test]
    fn observation_lands_in_the_right_bucket() {
        let metrics = Metrics::new(&test_config()).unwrap();
        metrics.record_http_request("POST", "/items", 201, 12.0);

        let text = metrics.render().unwrap();
        let bucket = |le| {
            sample(
                &text,
                "http_request_duration_ms_bucket",
                &[("method", "POST"), ("status_code", "201"), ("le", le)],
            )
        };
        assert_eq!(bucket("5"), Some(0.0));
        assert_eq!(bucket("15"), Some(1.0));
        assert_eq!(bucket("500"), Some(1.0));
        assert_eq!(
            sample(&text, "http_request_duration_ms_sum", &[("method", "POST")]),
            Some(12.0)
        );
    }

    #[test]
    fn separate_label_sets_are_separate_series() {
        let metrics = Metrics::new(&test_config()).unwrap();
        metrics.record_http_request("GET", "/items", 200, 1.0);
        metrics.record_http_request("GET", "/items", 200, 1.0);
        metrics.record_http_request("GET", "/items", 500, 1.0);

        let text = metrics.render().unwrap();
        let ok = [("route", "/items"), ("status_code", "200")];
        let failed = [("route", "/items"), ("status_code", "500")];
        assert_eq!(sample(&text, "http_requests_total", &ok), Some(2.0));
        assert_eq!(sample(&text, "http_requests_total", &failed), Some(1.0));
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let metrics = Metrics::new(&test_config()).unwrap();
        let first = IntCounter::new("seeded_items_total", "Items inserted by seeding").unwrap();
        let second = IntCounter::new("seeded_items_total", "Items inserted by seeding").unwrap();

        assert!(metrics.register(Box::new(first)).is_ok());
        assert!(matches!(
            metrics.register(Box::new(second)),
            Err(MetricsError::Registration(_))
        ));
    }

    #[test]
    fn register_rejects_builtin_http_series() {
        let metrics = Metrics::new(&test_config()).unwrap();
        let clash = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &HTTP_REQUEST_LABELS,
        )
        .unwrap();
        assert!(metrics.register(Box::new(clash)).is_err());
    }

    #[test]
    fn content_type_is_prometheus_text() {
        let metrics = Metrics::new(&test_config()).unwrap();
        assert!(metrics.content_type().starts_with("text/plain"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn process_metrics_are_registered_when_enabled() {
        let config = MetricsConfig {
            app_label: "test-app".to_string(),
            process_metrics: true,
        };
        let metrics = Metrics::new(&config).unwrap();
        let text = metrics.render().unwrap();
        assert!(text.contains("process_start_time_seconds"));
    }
}
