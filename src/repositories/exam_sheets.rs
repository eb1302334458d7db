use sqlx::PgPool;

use crate::db::models::ExamSheet;

pub(crate) const COLUMNS: &str = "id, title, owner_id, max_points, created_at, updated_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    title: &str,
    owner_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<ExamSheet, sqlx::Error> {
    sqlx::query_as::<_, ExamSheet>(&format!(
        "INSERT INTO exam_sheets (id, title, owner_id, max_points, created_at, updated_at)
         VALUES ($1,$2,$3,0,$4,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(title)
    .bind(owner_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamSheet>, sqlx::Error> {
    sqlx::query_as::<_, ExamSheet>(&format!("SELECT {COLUMNS} FROM exam_sheets WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list_by_owner(
    pool: &PgPool,
    owner_id: &str,
) -> Result<Vec<ExamSheet>, sqlx::Error> {
    sqlx::query_as::<_, ExamSheet>(&format!(
        "SELECT {COLUMNS} FROM exam_sheets WHERE owner_id = $1 ORDER BY created_at, id",
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

/// Takes the sheet's row lock. Every change to the sheet's tasks goes through
/// this first, which serializes recomputation of `max_points`.
pub(crate) async fn lock_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<ExamSheet>, sqlx::Error> {
    sqlx::query_as::<_, ExamSheet>(&format!(
        "SELECT {COLUMNS} FROM exam_sheets WHERE id = $1 FOR UPDATE",
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn update_title(
    pool: &PgPool,
    id: &str,
    title: &str,
    now: time::PrimitiveDateTime,
) -> Result<Option<ExamSheet>, sqlx::Error> {
    sqlx::query_as::<_, ExamSheet>(&format!(
        "UPDATE exam_sheets SET title = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}",
    ))
    .bind(title)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Tasks cascade with the sheet. Answers reference tasks without a cascade,
/// so the sheet's exams (and with them the answers) must be gone first.
pub(crate) async fn delete_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM exam_sheets WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}
