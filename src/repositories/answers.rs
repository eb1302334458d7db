use sqlx::PgPool;

use crate::db::models::Answer;

pub(crate) const COLUMNS: &str =
    "id, answer, exam_id, task_id, user_id, assigned_points, created_at, updated_at";

pub(crate) async fn list_by_exam(pool: &PgPool, exam_id: &str) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE exam_id = $1 ORDER BY created_at, id",
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_in_exam(
    pool: &PgPool,
    exam_id: &str,
    answer_id: &str,
) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE id = $1 AND exam_id = $2",
    ))
    .bind(answer_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn lock_in_exam(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    answer_id: &str,
) -> Result<Option<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE id = $1 AND exam_id = $2 FOR UPDATE",
    ))
    .bind(answer_id)
    .bind(exam_id)
    .fetch_optional(executor)
    .await
}

pub(crate) struct CreateAnswer<'a> {
    pub(crate) id: &'a str,
    pub(crate) exam_id: &'a str,
    pub(crate) task_id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) answer: &'a str,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAnswer<'_>,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (
            id, answer, exam_id, task_id, user_id, assigned_points, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,0,$6,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.answer)
    .bind(params.exam_id)
    .bind(params.task_id)
    .bind(params.user_id)
    .bind(params.now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    answer_id: &str,
    answer: &str,
    assigned_points: i32,
    now: time::PrimitiveDateTime,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "UPDATE answers SET answer = $1, assigned_points = $2, updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(answer)
    .bind(assigned_points)
    .bind(now)
    .bind(answer_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    answer_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM answers WHERE id = $1").bind(answer_id).execute(executor).await?;
    Ok(())
}

pub(crate) async fn exam_ids_for_task(
    executor: impl sqlx::PgExecutor<'_>,
    task_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT exam_id FROM answers WHERE task_id = $1 ORDER BY exam_id",
    )
    .bind(task_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn delete_by_task(
    executor: impl sqlx::PgExecutor<'_>,
    task_id: &str,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM answers WHERE task_id = $1").bind(task_id).execute(executor).await?;
    Ok(result.rows_affected())
}
