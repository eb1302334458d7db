use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::extract::{decode, ApiJson};
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::task::{TaskCreate, TaskResponse, TaskUpdate, TaskWriteResponse};
use crate::services::authorization::{authorize, Actor, Operation, Target};
use crate::services::grading;

use super::super::helpers::{check_task_payload, load_sheet};

pub(in crate::api::exam_sheets) async fn list_tasks(
    Path(sheet_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::List,
        Target::SheetTask { sheet_owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let tasks = repositories::tasks::list_by_sheet(state.db(), &sheet.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tasks"))?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub(in crate::api::exam_sheets) async fn create_task(
    Path(sheet_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<(StatusCode, Json<TaskWriteResponse>), ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Create,
        Target::SheetTask { sheet_owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let payload: TaskCreate = decode(body)?;
    check_task_payload(&sheet.id, payload.exam_sheet.as_deref(), payload.validate())?;

    let written = grading::create_task(
        state.db(),
        &sheet.id,
        grading::NewTask { question: &payload.question, max_points: payload.max_points },
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        sheet_id = %sheet.id,
        task_id = %written.task.id,
        sheet_max_points = written.sheet_max_points,
        action = "task_created",
        "Task created"
    );

    Ok((
        StatusCode::CREATED,
        Json(TaskWriteResponse {
            task: TaskResponse::from(written.task),
            sheet_max_points: written.sheet_max_points,
        }),
    ))
}

pub(in crate::api::exam_sheets) async fn get_task(
    Path((sheet_id, task_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TaskResponse>, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Retrieve,
        Target::SheetTask { sheet_owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let task = repositories::tasks::find_in_sheet(state.db(), &sheet.id, &task_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(task)))
}

pub(in crate::api::exam_sheets) async fn update_task(
    Path((sheet_id, task_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<TaskWriteResponse>, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Update,
        Target::SheetTask { sheet_owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let payload: TaskUpdate = decode(body)?;
    check_task_payload(&sheet.id, payload.exam_sheet.as_deref(), payload.validate())?;

    let written = grading::update_task(
        state.db(),
        &sheet.id,
        &task_id,
        grading::TaskChanges {
            question: payload.question.as_deref(),
            max_points: payload.max_points,
        },
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        sheet_id = %sheet.id,
        task_id = %written.task.id,
        sheet_max_points = written.sheet_max_points,
        action = "task_updated",
        "Task updated"
    );

    Ok(Json(TaskWriteResponse {
        task: TaskResponse::from(written.task),
        sheet_max_points: written.sheet_max_points,
    }))
}

pub(in crate::api::exam_sheets) async fn delete_task(
    Path((sheet_id, task_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let sheet = load_sheet(&state, &sheet_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Delete,
        Target::SheetTask { sheet_owner_id: &sheet.owner_id },
    )
    .into_result()?;

    let removal = grading::delete_task(state.db(), &sheet.id, &task_id).await?;

    tracing::info!(
        user_id = %user.id,
        sheet_id = %sheet.id,
        task_id = %task_id,
        removed_answers = removal.removed_answers,
        recomputed_exams = removal.recomputed_exams.len(),
        sheet_max_points = removal.sheet_max_points,
        action = "task_deleted",
        "Task deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
