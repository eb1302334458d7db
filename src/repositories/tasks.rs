use sqlx::PgPool;

use crate::db::models::Task;

pub(crate) const COLUMNS: &str = "id, question, max_points, exam_sheet_id, created_at, updated_at";

pub(crate) async fn list_by_sheet(pool: &PgPool, sheet_id: &str) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {COLUMNS} FROM tasks WHERE exam_sheet_id = $1 ORDER BY created_at, id",
    ))
    .bind(sheet_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_in_sheet(
    pool: &PgPool,
    sheet_id: &str,
    task_id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {COLUMNS} FROM tasks WHERE id = $1 AND exam_sheet_id = $2",
    ))
    .bind(task_id)
    .bind(sheet_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn lock_in_sheet(
    executor: impl sqlx::PgExecutor<'_>,
    sheet_id: &str,
    task_id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {COLUMNS} FROM tasks WHERE id = $1 AND exam_sheet_id = $2 FOR UPDATE",
    ))
    .bind(task_id)
    .bind(sheet_id)
    .fetch_optional(executor)
    .await
}

/// Reads a task while keeping concurrent edits of its `max_points` out until
/// the caller commits.
pub(crate) async fn find_for_share(
    executor: impl sqlx::PgExecutor<'_>,
    task_id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR SHARE"))
        .bind(task_id)
        .fetch_optional(executor)
        .await
}

pub(crate) struct CreateTask<'a> {
    pub(crate) id: &'a str,
    pub(crate) sheet_id: &'a str,
    pub(crate) question: &'a str,
    pub(crate) max_points: i32,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateTask<'_>,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, question, max_points, exam_sheet_id, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.question)
    .bind(params.max_points)
    .bind(params.sheet_id)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    task_id: &str,
    question: &str,
    max_points: i32,
    now: time::PrimitiveDateTime,
) -> Result<Task, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks SET question = $1, max_points = $2, updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(question)
    .bind(max_points)
    .bind(now)
    .bind(task_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    task_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tasks WHERE id = $1").bind(task_id).execute(executor).await?;
    Ok(())
}

/// Highest score any answer currently holds for the task.
pub(crate) async fn max_assigned_points(
    executor: impl sqlx::PgExecutor<'_>,
    task_id: &str,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<i32>>(
        "SELECT MAX(assigned_points) FROM answers WHERE task_id = $1",
    )
    .bind(task_id)
    .fetch_one(executor)
    .await
}
