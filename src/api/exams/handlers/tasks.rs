//! Tasks seen through an exam. Candidates read the questions here; the tasks
//! themselves are authored only under their sheet.

use axum::extract::{Path, State};
use axum::http::Method;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::task::TaskResponse;
use crate::services::authorization::{authorize, Actor, Operation, Target};

use super::super::helpers::{load_exam, write_operation};

pub(in crate::api::exams) async fn list_exam_tasks(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(
        Actor::from(&user),
        Operation::List,
        Target::ExamTask { candidate_id: &chain.candidate_id },
    )
    .into_result()?;

    let tasks = repositories::tasks::list_by_sheet(state.db(), &chain.exam_sheet_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tasks"))?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub(in crate::api::exams) async fn get_exam_task(
    Path((exam_id, task_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TaskResponse>, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(
        Actor::from(&user),
        Operation::Retrieve,
        Target::ExamTask { candidate_id: &chain.candidate_id },
    )
    .into_result()?;

    let task = repositories::tasks::find_in_sheet(state.db(), &chain.exam_sheet_id, &task_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse::from(task)))
}

pub(in crate::api::exams) async fn reject_exam_task_write(
    method: Method,
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TaskResponse>, ApiError> {
    deny_write(&state, &user, &exam_id, &method).await
}

pub(in crate::api::exams) async fn reject_exam_task_item_write(
    method: Method,
    Path((exam_id, _task_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TaskResponse>, ApiError> {
    deny_write(&state, &user, &exam_id, &method).await
}

async fn deny_write(
    state: &AppState,
    user: &crate::db::models::User,
    exam_id: &str,
    method: &Method,
) -> Result<Json<TaskResponse>, ApiError> {
    let chain = load_exam(state, exam_id).await?;
    authorize(
        Actor::from(user),
        write_operation(method),
        Target::ExamTask { candidate_id: &chain.candidate_id },
    )
    .into_result()?;

    // The guard never allows writes on this route.
    Err(ApiError::internal(
        format!("write allowed on exam task route for {method}"),
        "Unexpected authorization outcome",
    ))
}
