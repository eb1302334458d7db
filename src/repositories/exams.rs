use sqlx::PgPool;

use crate::db::models::Exam;

pub(crate) const COLUMNS: &str =
    "id, exam_sheet_id, user_id, achieved_points, created_at, updated_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    sheet_id: &str,
    user_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (id, exam_sheet_id, user_id, achieved_points, created_at, updated_at)
         VALUES ($1,$2,$3,0,$4,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(sheet_id)
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Exams visible to a user: the ones they take and the ones taken on sheets
/// they own.
pub(crate) async fn list_visible_to(pool: &PgPool, user_id: &str) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(
        "SELECT e.id, e.exam_sheet_id, e.user_id, e.achieved_points, e.created_at, e.updated_at
         FROM exams e
         JOIN exam_sheets s ON s.id = e.exam_sheet_id
         WHERE e.user_id = $1 OR s.owner_id = $1
         ORDER BY e.created_at, e.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn lock_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Locks every exam on a sheet in id order. Answer writes lock their exam
/// before the task, so anything that locks a task and then exams has to take
/// these first.
pub(crate) async fn lock_by_sheet(
    executor: impl sqlx::PgExecutor<'_>,
    sheet_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT id FROM exams WHERE exam_sheet_id = $1 ORDER BY id FOR UPDATE",
    )
    .bind(sheet_id)
    .fetch_all(executor)
    .await
}

/// Answers go with the exam through `ON DELETE CASCADE`.
pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Removes every exam on a sheet. Their answers go through `ON DELETE CASCADE`
/// on `answers.exam_id`; the caller holds the sheet lock.
pub(crate) async fn delete_by_sheet(
    executor: impl sqlx::PgExecutor<'_>,
    sheet_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE exam_sheet_id = $1")
        .bind(sheet_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
