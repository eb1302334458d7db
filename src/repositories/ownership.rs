//! Resolution of ownership chains.
//!
//! Sheet -> owner and answer -> exam -> sheet -> owner are read in one query
//! each, so the guard sees the owners that were current at a single point in
//! time. A `None` means the route root does not exist, which callers report as
//! 404 before any permission check.

use sqlx::PgPool;

use crate::db::models::{Exam, ExamSheet};

/// An exam together with the sheet it instantiates.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ExamChain {
    pub(crate) exam_id: String,
    pub(crate) exam_sheet_id: String,
    pub(crate) candidate_id: String,
    pub(crate) sheet_owner_id: String,
    pub(crate) achieved_points: i64,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

impl ExamChain {
    pub(crate) fn into_exam(self) -> Exam {
        Exam {
            id: self.exam_id,
            exam_sheet_id: self.exam_sheet_id,
            user_id: self.candidate_id,
            achieved_points: self.achieved_points,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub(crate) async fn resolve_sheet(
    pool: &PgPool,
    sheet_id: &str,
) -> Result<Option<ExamSheet>, sqlx::Error> {
    super::exam_sheets::find_by_id(pool, sheet_id).await
}

pub(crate) async fn resolve_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Option<ExamChain>, sqlx::Error> {
    sqlx::query_as::<_, ExamChain>(
        "SELECT e.id AS exam_id,
                e.exam_sheet_id,
                e.user_id AS candidate_id,
                s.owner_id AS sheet_owner_id,
                e.achieved_points,
                e.created_at,
                e.updated_at
         FROM exams e
         JOIN exam_sheets s ON s.id = e.exam_sheet_id
         WHERE e.id = $1",
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}
