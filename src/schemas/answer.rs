use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::to_rfc3339;
use crate::db::models::Answer;

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerCreate {
    pub(crate) task: String,
    #[serde(default)]
    pub(crate) answer: String,
}

/// The candidate edits `answer`; the sheet owner grades via `assigned_points`.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnswerUpdate {
    #[serde(default)]
    pub(crate) answer: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub(crate) assigned_points: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: String,
    pub(crate) answer: String,
    pub(crate) exam: String,
    pub(crate) task: String,
    pub(crate) user: String,
    pub(crate) assigned_points: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<Answer> for AnswerResponse {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id,
            answer: answer.answer,
            exam: answer.exam_id,
            task: answer.task_id,
            user: answer.user_id,
            assigned_points: answer.assigned_points,
            created_at: to_rfc3339(answer.created_at),
            updated_at: to_rfc3339(answer.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerWriteResponse {
    #[serde(flatten)]
    pub(crate) answer: AnswerResponse,
    pub(crate) achieved_points: i64,
}
