use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::api::errors::ApiError;

/// `Json` with rejections reported through [`ApiError`], so a malformed body is
/// a 400 with the usual error shape.
pub(crate) struct ApiJson<T>(pub(crate) T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(reject(rejection)),
        }
    }
}

fn reject(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    ApiError::BadRequest(rejection.body_text())
}

/// Decodes a body that was accepted as raw JSON. Handlers that guard a nested
/// resource decode only after authorization, so an outsider sending a bad
/// payload still sees 403.
pub(crate) fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|err| ApiError::BadRequest(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[allow(dead_code)]
        points: i32,
    }

    #[test]
    fn decode_reports_type_errors_as_bad_request() {
        let err = decode::<Probe>(serde_json::json!({"points": "many"})).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(message) if message.contains("invalid type")));
    }
}
