use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::extract::{decode, ApiJson};
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::answer::{AnswerCreate, AnswerResponse, AnswerUpdate, AnswerWriteResponse};
use crate::services::authorization::{authorize, Actor, Operation, FORBIDDEN};
use crate::services::errors::FieldErrors;
use crate::services::grading;

use super::super::helpers::{answer_target, load_exam};

pub(in crate::api::exams) async fn list_answers(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnswerResponse>>, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(Actor::from(&user), Operation::List, answer_target(&chain)).into_result()?;

    let answers = repositories::answers::list_by_exam(state.db(), &chain.exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    Ok(Json(answers.into_iter().map(AnswerResponse::from).collect()))
}

pub(in crate::api::exams) async fn create_answer(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<(StatusCode, Json<AnswerWriteResponse>), ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(Actor::from(&user), Operation::Create, answer_target(&chain)).into_result()?;

    let payload: AnswerCreate = decode(body)?;
    let written = grading::create_answer(
        state.db(),
        &chain.exam_id,
        grading::NewAnswer {
            task_id: &payload.task,
            candidate_id: &user.id,
            answer: &payload.answer,
        },
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        exam_id = %chain.exam_id,
        answer_id = %written.answer.id,
        action = "answer_created",
        "Answer created"
    );

    Ok((
        StatusCode::CREATED,
        Json(AnswerWriteResponse {
            answer: AnswerResponse::from(written.answer),
            achieved_points: written.achieved_points,
        }),
    ))
}

pub(in crate::api::exams) async fn get_answer(
    Path((exam_id, answer_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(Actor::from(&user), Operation::Retrieve, answer_target(&chain)).into_result()?;

    let answer = repositories::answers::find_in_exam(state.db(), &chain.exam_id, &answer_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answer"))?
        .ok_or_else(|| ApiError::NotFound("Answer not found".to_string()))?;

    Ok(Json(AnswerResponse::from(answer)))
}

/// The candidate may rewrite the answer text; the sheet owner may grade it.
/// A payload touching a field the actor does not control is forbidden as a
/// whole.
pub(in crate::api::exams) async fn update_answer(
    Path((exam_id, answer_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<AnswerWriteResponse>, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    let actor = Actor::from(&user);
    let target = answer_target(&chain);

    let may_edit = authorize(actor, Operation::Update, target).is_allowed();
    let may_grade = authorize(actor, Operation::Grade, target).is_allowed();
    if !may_edit && !may_grade {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }

    let payload: AnswerUpdate = decode(body)?;
    if (payload.answer.is_some() && !may_edit) || (payload.assigned_points.is_some() && !may_grade)
    {
        return Err(ApiError::Forbidden(FORBIDDEN));
    }
    payload.validate()?;
    if payload.answer.is_none() && payload.assigned_points.is_none() {
        return Err(ApiError::Validation(FieldErrors::single(
            "non_field_errors",
            "Provide answer or assigned_points.",
        )));
    }

    let written = grading::update_answer(
        state.db(),
        &chain.exam_id,
        &answer_id,
        grading::AnswerChanges {
            answer: payload.answer.as_deref(),
            assigned_points: payload.assigned_points,
        },
    )
    .await?;

    tracing::info!(
        user_id = %user.id,
        exam_id = %chain.exam_id,
        answer_id = %written.answer.id,
        graded = payload.assigned_points.is_some(),
        achieved_points = written.achieved_points,
        action = "answer_updated",
        "Answer updated"
    );

    Ok(Json(AnswerWriteResponse {
        answer: AnswerResponse::from(written.answer),
        achieved_points: written.achieved_points,
    }))
}

pub(in crate::api::exams) async fn delete_answer(
    Path((exam_id, answer_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let chain = load_exam(&state, &exam_id).await?;
    authorize(Actor::from(&user), Operation::Delete, answer_target(&chain)).into_result()?;

    let achieved_points = grading::delete_answer(state.db(), &chain.exam_id, &answer_id).await?;

    tracing::info!(
        user_id = %user.id,
        exam_id = %chain.exam_id,
        answer_id = %answer_id,
        achieved_points,
        action = "answer_deleted",
        "Answer deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
