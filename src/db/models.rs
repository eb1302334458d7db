use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) is_examinator: bool,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// `max_points` mirrors the sum of the sheet's task points and is only ever
/// written by the aggregate recalculator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ExamSheet {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) owner_id: String,
    pub(crate) max_points: i64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Task {
    pub(crate) id: String,
    pub(crate) question: String,
    pub(crate) max_points: i32,
    pub(crate) exam_sheet_id: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One candidate's attempt at a sheet. `achieved_points` mirrors the sum of
/// the attempt's answer points.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) exam_sheet_id: String,
    pub(crate) user_id: String,
    pub(crate) achieved_points: i64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: String,
    pub(crate) answer: String,
    pub(crate) exam_id: String,
    pub(crate) task_id: String,
    pub(crate) user_id: String,
    pub(crate) assigned_points: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
