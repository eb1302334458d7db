use serde::{Deserialize, Serialize};

use crate::core::time::to_rfc3339;
use crate::db::models::Exam;

#[derive(Debug, Deserialize)]
pub(crate) struct ExamCreate {
    pub(crate) exam_sheet: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) exam_sheet: String,
    pub(crate) user: String,
    pub(crate) achieved_points: i64,
    pub(crate) created_at: String,
}

impl From<Exam> for ExamResponse {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            exam_sheet: exam.exam_sheet_id,
            user: exam.user_id,
            achieved_points: exam.achieved_points,
            created_at: to_rfc3339(exam.created_at),
        }
    }
}
