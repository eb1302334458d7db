use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{decode, ApiJson};
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::utc_now;
use crate::repositories;
use crate::schemas::exam::{ExamCreate, ExamResponse};
use crate::schemas::ConsistencyResponse;
use crate::services::aggregates::{self, EXAM_AGGREGATE};
use crate::services::authorization::{authorize, Actor, Operation, Target};
use crate::services::errors::FieldErrors;

use super::super::helpers::{exam_target, load_exam};

pub(in crate::api::exams) async fn start_exam(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    authorize(Actor::from(&user), Operation::Create, Target::ExamCollection).into_result()?;

    let payload: ExamCreate = decode(body)?;
    let sheet = repositories::exam_sheets::find_by_id(state.db(), &payload.exam_sheet)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam sheet"))?
        .ok_or_else(|| {
            ApiError::Validation(FieldErrors::single(
                "exam_sheet",
                "Invalid exam sheet reference: object does not exist.",
            ))
        })?;

    let exam = repositories::exams::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &sheet.id,
        &user.id,
        utc_now(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to start exam"))?;

    tracing::info!(
        user_id = %user.id,
        sheet_id = %sheet.id,
        exam_id = %exam.id,
        action = "exam_started",
        "Exam started"
    );

    Ok((StatusCode::CREATED, Json(ExamResponse::from(exam))))
}

pub(in crate::api::exams) async fn list_exams(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    authorize(Actor::from(&user), Operation::List, Target::ExamCollection).into_result()?;

    let exams = repositories::exams::list_visible_to(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    Ok(Json(exams.into_iter().map(ExamResponse::from).collect()))
}

pub(in crate::api::exams) async fn get_exam(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(Actor::from(&user), Operation::Retrieve, exam_target(&chain)).into_result()?;

    Ok(Json(ExamResponse::from(chain.into_exam())))
}

pub(in crate::api::exams) async fn delete_exam(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(Actor::from(&user), Operation::Delete, exam_target(&chain)).into_result()?;

    let deleted = repositories::exams::delete_by_id(state.db(), &chain.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;
    if !deleted {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    tracing::info!(
        user_id = %user.id,
        exam_id = %chain.exam_id,
        action = "exam_deleted",
        "Exam deleted with its answers"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Owner-only diagnostic comparing the cached score with the live sum.
pub(in crate::api::exams) async fn exam_consistency(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ConsistencyResponse>, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Retrieve,
        Target::ExamSheet { owner_id: &chain.sheet_owner_id },
    )
    .into_result()?;

    let check = aggregates::verify_exam(state.db(), &chain.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to verify exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    Ok(Json(ConsistencyResponse::new(EXAM_AGGREGATE, chain.exam_id, check)))
}
