use serde::Serialize;

use crate::services::aggregates::AggregateCheck;

pub(crate) mod answer;
pub(crate) mod exam;
pub(crate) mod exam_sheet;
pub(crate) mod task;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: &'static str,
    pub(crate) status: &'static str,
    pub(crate) database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub(crate) struct DatabaseHealth {
    pub(crate) healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) applied_migrations: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConsistencyResponse {
    pub(crate) aggregate: &'static str,
    pub(crate) id: String,
    pub(crate) cached: i64,
    pub(crate) actual: i64,
    pub(crate) consistent: bool,
}

impl ConsistencyResponse {
    pub(crate) fn new(aggregate: &'static str, id: String, check: AggregateCheck) -> Self {
        Self {
            aggregate,
            id,
            cached: check.cached,
            actual: check.actual,
            consistent: check.is_consistent(),
        }
    }
}
