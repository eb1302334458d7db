use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::{DatabaseHealth, HealthResponse, RootResponse};

const SERVICE_NAME: &str = "examsheets-api";

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let service = state.settings().service();
    Json(RootResponse { message: service.name.clone(), version: service.version.clone() })
}

/// 200 when the database answers and is migrated, 503 otherwise.
pub(crate) async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match repositories::health::probe(state.db()).await {
        Ok(probe) => DatabaseHealth {
            healthy: true,
            latency_ms: Some(probe.round_trip.as_secs_f64() * 1000.0),
            applied_migrations: Some(probe.applied_migrations),
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "Health probe failed");
            DatabaseHealth {
                healthy: false,
                latency_ms: None,
                applied_migrations: None,
                error: Some(err.to_string()),
            }
        }
    };

    let status = if database.healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = HealthResponse {
        service: SERVICE_NAME,
        status: if database.healthy { "healthy" } else { "unhealthy" },
        database,
    };
    (status, Json(body))
}

/// Only routed when the exporter is enabled.
pub(crate) async fn metrics() -> Response {
    match metrics::render() {
        Some(body) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
