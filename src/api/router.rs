use std::time::Duration;

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{MakeSpan, OnResponse, TraceLayer};
use tracing::Span;

use crate::api::{exam_sheets, exams, handlers, users};
use crate::core::metrics;
use crate::core::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub(crate) fn router(state: AppState) -> Router {
    let settings = state.settings();

    let api = Router::new()
        .nest("/users", users::router())
        .nest("/exam-sheets", exam_sheets::router())
        .nest("/exams", exams::router());

    let mut app = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz).head(handlers::healthz))
        .nest(&settings.service().api_prefix, api);

    if settings.observability().metrics_enabled {
        app = app.route("/metrics", get(handlers::metrics));
    }

    // Outermost last: the request id exists before the trace span opens.
    app.layer(TraceLayer::new_for_http().make_span_with(RequestSpan).on_response(RecordResponse))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(cors_layer(&settings.service().cors_origins))
        .with_state(state)
}

#[derive(Clone, Copy)]
struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id =
            request.headers().get(&REQUEST_ID).and_then(|value| value.to_str().ok()).unwrap_or("-");
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id,
            status = tracing::field::Empty,
        )
    }
}

#[derive(Clone, Copy)]
struct RecordResponse;

impl OnResponse<Body> for RecordResponse {
    fn on_response(self, response: &Response<Body>, latency: Duration, span: &Span) {
        let status = response.status();
        span.record("status", status.as_u16());
        metrics::record_http_response(status, latency);
        tracing::debug!(latency_ms = latency.as_millis() as u64, "Response sent");
    }
}

/// Configured origins get credentialed CORS; without any, every origin is
/// allowed but credentials are not.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, REQUEST_ID])
        .expose_headers([REQUEST_ID])
        .max_age(Duration::from_secs(600));

    let allowed: Vec<HeaderValue> =
        origins.iter().filter_map(|origin| HeaderValue::from_str(origin).ok()).collect();
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed)).allow_credentials(true)
    }
}
