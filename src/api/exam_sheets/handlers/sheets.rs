use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::extract::{decode, ApiJson};
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::utc_now;
use crate::repositories;
use crate::schemas::exam_sheet::{ExamSheetCreate, ExamSheetResponse, ExamSheetUpdate};
use crate::schemas::ConsistencyResponse;
use crate::services::aggregates::{self, SHEET_AGGREGATE};
use crate::services::authorization::{authorize, Actor, Operation, Target};
use crate::services::grading;

use super::super::helpers::load_sheet;

pub(in crate::api::exam_sheets) async fn create_sheet(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<(StatusCode, Json<ExamSheetResponse>), ApiError> {
    authorize(Actor::from(&user), Operation::Create, Target::SheetCollection).into_result()?;

    let payload: ExamSheetCreate = decode(body)?;
    payload.validate()?;

    let sheet = repositories::exam_sheets::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        payload.title.trim(),
        &user.id,
        utc_now(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam sheet"))?;

    tracing::info!(
        user_id = %user.id,
        sheet_id = %sheet.id,
        action = "exam_sheet_created",
        "Exam sheet created"
    );

    Ok((StatusCode::CREATED, Json(ExamSheetResponse::from(sheet))))
}

pub(in crate::api::exam_sheets) async fn list_sheets(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamSheetResponse>>, ApiError> {
    authorize(Actor::from(&user), Operation::List, Target::SheetCollection).into_result()?;

    let sheets = repositories::exam_sheets::list_by_owner(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exam sheets"))?;

    Ok(Json(sheets.into_iter().map(ExamSheetResponse::from).collect()))
}

pub(in crate::api::exam_sheets) async fn get_sheet(
    Path(sheet_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamSheetResponse>, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Retrieve,
        Target::ExamSheet { owner_id: &sheet.owner_id },
    )
    .into_result()?;

    Ok(Json(ExamSheetResponse::from(sheet)))
}

pub(in crate::api::exam_sheets) async fn update_sheet(
    Path(sheet_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<ExamSheetResponse>, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Update,
        Target::ExamSheet { owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let payload: ExamSheetUpdate = decode(body)?;
    payload.validate()?;

    let updated = repositories::exam_sheets::update_title(
        state.db(),
        &sheet.id,
        payload.title.trim(),
        utc_now(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam sheet"))?
    .ok_or_else(|| ApiError::NotFound("Exam sheet not found".to_string()))?;

    Ok(Json(ExamSheetResponse::from(updated)))
}

pub(in crate::api::exam_sheets) async fn delete_sheet(
    Path(sheet_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Delete,
        Target::ExamSheet { owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let removal = grading::delete_sheet(state.db(), &sheet.id).await?;

    tracing::info!(
        user_id = %user.id,
        sheet_id = %sheet.id,
        removed_exams = removal.removed_exams,
        action = "exam_sheet_deleted",
        "Exam sheet deleted with its tasks and exams"
    );

    Ok(StatusCode::NO_CONTENT)
}

pub(in crate::api::exam_sheets) async fn sheet_consistency(
    Path(sheet_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ConsistencyResponse>, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Retrieve,
        Target::ExamSheet { owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let check = aggregates::verify_sheet(state.db(), &sheet.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to verify exam sheet"))?
        .ok_or_else(|| ApiError::NotFound("Exam sheet not found".to_string()))?;

    Ok(Json(ConsistencyResponse::new(SHEET_AGGREGATE, sheet.id, check)))
}
