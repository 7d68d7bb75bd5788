//! Request instrumentation middleware.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use super::recorder::{Metrics, MetricsRecorder};

/// Measures one request from arrival until its response is produced.
///
/// [`InFlightRequest::finish`] consumes the guard, so a request is recorded at
/// most once. A guard dropped without finishing (the client went away before
/// a response existed) records nothing.
pub struct InFlightRequest<R: MetricsRecorder> {
    recorder: R,
    method: String,
    route: String,
    started_at: Instant,
    finished: bool,
}

impl<R: MetricsRecorder> InFlightRequest<R> {
    pub fn start(recorder: R, method: impl Into<String>, route: impl Into<String>) -> Self {
        InFlightRequest {
            recorder,
            method: method.into(),
            route: route.into(),
            started_at: Instant::now(),
            finished: false,
        }
    }

    /// Records the request under its final status code.
    pub fn finish(mut self, status: StatusCode) {
        let duration_ms = self.started_at.elapsed().as_secs_f64() * 1000.0;
        self.recorder
            .record_http_request(&self.method, &self.route, status.as_u16(), duration_ms);
        self.finished = true;
    }
}

impl<R: MetricsRecorder> Drop for InFlightRequest<R> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                method = %self.method,
                route = %self.route,
                "Request dropped before a response was produced, not recorded"
            );
        }
    }
}

/// Route label for a request: the matched route pattern, or the raw path when
/// no route matched.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Middleware recording `http_requests_total` and `http_request_duration_ms`
/// for every request passing through the router.
pub async fn track_http_metrics(
    State(metrics): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let in_flight =
        InFlightRequest::start(metrics, request.method().as_str(), route_label(&request));
    let response = next.run(request).await;
    in_flight.finish(response.status());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingRecorder {
        calls: Arc<Mutex<Vec<(String, String, u16, f64)>>>,
    }

    impl MetricsRecorder for RecordingRecorder {
        fn record_http_request(
            &self,
            method: &str,
            route: &str,
            status_code: u16,
            duration_ms: f64,
        ) {
            self.calls.lock().unwrap().push((
                method.to_string(),
                route.to_string(),
                status_code,
                duration_ms,
            ));
        }
    }

    #[test]
    fn finish_records_exactly_once() {
        let recorder = RecordingRecorder::default();
        let in_flight = InFlightRequest::start(recorder.clone(), "POST", "/items");
        in_flight.finish(StatusCode::CREATED);

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (method, route, status, duration_ms) = &calls[0];
        assert_eq!(method, "POST");
        assert_eq!(route, "/items");
        assert_eq!(*status, 201);
        assert!(*duration_ms >= 0.0);
    }

    #[test]
    fn dropped_guard_records_nothing() {
        let recorder = RecordingRecorder::default();
        {
            let _in_flight = InFlightRequest::start(recorder.clone(), "GET", "/items");
        }
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn duration_is_in_milliseconds() {
        let recorder = RecordingRecorder::default();
        let in_flight = InFlightRequest::start(recorder.clone(), "GET", "/");
        std::thread::sleep(std::time::Duration::from_millis(20));
        in_flight.finish(StatusCode::OK);

        let duration_ms = recorder.calls.lock().unwrap()[0].3;
        assert!(duration_ms >= 20.0, "expected >= 20ms, got {}", duration_ms);
        assert!(duration_ms < 20_000.0);
    }
}
