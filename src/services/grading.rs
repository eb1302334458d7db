//! Transactional task and answer changes.
//!
//! Each workflow locks the aggregate root, mutates, recomputes the derived
//! totals on the same connection and commits. Returning early with an error
//! drops the transaction, which rolls everything back. Lock order across all
//! workflows is sheet, then exams (by id), then task.
//!
//! Authorization happens before these are called; they only enforce the rules
//! that need locked data.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::utc_now;
use crate::db::models::{Answer, Task};
use crate::repositories;
use crate::services::aggregates;
use crate::services::authorization::{
    check_answer_task_reference, check_assigned_points, check_task_max_points_floor,
};
use crate::services::errors::{FieldErrors, GradingError};

pub(crate) struct NewTask<'a> {
    pub(crate) question: &'a str,
    pub(crate) max_points: i32,
}

#[derive(Default)]
pub(crate) struct TaskChanges<'a> {
    pub(crate) question: Option<&'a str>,
    pub(crate) max_points: Option<i32>,
}

#[derive(Debug)]
pub(crate) struct TaskWrite {
    pub(crate) task: Task,
    pub(crate) sheet_max_points: i64,
}

#[derive(Debug)]
pub(crate) struct TaskRemoval {
    pub(crate) removed_answers: u64,
    pub(crate) recomputed_exams: Vec<String>,
    pub(crate) sheet_max_points: i64,
}

pub(crate) async fn create_task(
    pool: &PgPool,
    sheet_id: &str,
    params: NewTask<'_>,
) -> Result<TaskWrite, GradingError> {
    let mut tx = pool.begin().await?;

    repositories::exam_sheets::lock_for_update(&mut *tx, sheet_id)
        .await?
        .ok_or(GradingError::NotFound("Exam sheet"))?;

    let task_id = Uuid::new_v4().to_string();
    let task = repositories::tasks::create(
        &mut *tx,
        repositories::tasks::CreateTask {
            id: &task_id,
            sheet_id,
            question: params.question,
            max_points: params.max_points,
            now: utc_now(),
        },
    )
    .await?;

    let sheet_max_points = aggregates::recompute_sheet_max_points(&mut *tx, sheet_id).await?;

    tx.commit().await?;
    Ok(TaskWrite { task, sheet_max_points })
}

pub(crate) async fn update_task(
    pool: &PgPool,
    sheet_id: &str,
    task_id: &str,
    changes: TaskChanges<'_>,
) -> Result<TaskWrite, GradingError> {
    let mut tx = pool.begin().await?;

    repositories::exam_sheets::lock_for_update(&mut *tx, sheet_id)
        .await?
        .ok_or(GradingError::NotFound("Exam sheet"))?;
    let current = repositories::tasks::lock_in_sheet(&mut *tx, sheet_id, task_id)
        .await?
        .ok_or(GradingError::NotFound("Task"))?;

    let question = changes.question.unwrap_or(&current.question);
    let max_points = changes.max_points.unwrap_or(current.max_points);

    if max_points < current.max_points {
        let highest = repositories::tasks::max_assigned_points(&mut *tx, task_id).await?;
        check_task_max_points_floor(max_points, highest).into_result()?;
    }

    let task =
        repositories::tasks::update(&mut *tx, task_id, question, max_points, utc_now())
            .await?;

    let sheet_max_points = aggregates::recompute_sheet_max_points(&mut *tx, sheet_id).await?;

    tx.commit().await?;
    Ok(TaskWrite { task, sheet_max_points })
}

/// Deletes a task together with every answer given to it, then recomputes the
/// sheet and each exam that lost an answer.
pub(crate) async fn delete_task(
    pool: &PgPool,
    sheet_id: &str,
    task_id: &str,
) -> Result<TaskRemoval, GradingError> {
    let mut tx = pool.begin().await?;

    repositories::exam_sheets::lock_for_update(&mut *tx, sheet_id)
        .await?
        .ok_or(GradingError::NotFound("Exam sheet"))?;
    repositories::exams::lock_by_sheet(&mut *tx, sheet_id).await?;
    repositories::tasks::lock_in_sheet(&mut *tx, sheet_id, task_id)
        .await?
        .ok_or(GradingError::NotFound("Task"))?;

    let affected_exams = repositories::answers::exam_ids_for_task(&mut *tx, task_id).await?;
    let removed_answers = repositories::answers::delete_by_task(&mut *tx, task_id).await?;
    repositories::tasks::delete_by_id(&mut *tx, task_id).await?;

    let sheet_max_points = aggregates::recompute_sheet_max_points(&mut *tx, sheet_id).await?;
    aggregates::recompute_exams(&mut *tx, &affected_exams).await?;

    tx.commit().await?;
    Ok(TaskRemoval { removed_answers, recomputed_exams: affected_exams, sheet_max_points })
}

#[derive(Debug)]
pub(crate) struct SheetRemoval {
    pub(crate) removed_exams: u64,
}

/// Deletes a sheet with its tasks, exams and answers. Exams go first so the
/// task cascade never meets a remaining answer.
pub(crate) async fn delete_sheet(
    pool: &PgPool,
    sheet_id: &str,
) -> Result<SheetRemoval, GradingError> {
    let mut tx = pool.begin().await?;

    repositories::exam_sheets::lock_for_update(&mut *tx, sheet_id)
        .await?
        .ok_or(GradingError::NotFound("Exam sheet"))?;
    let removed_exams = repositories::exams::delete_by_sheet(&mut *tx, sheet_id).await?;
    if !repositories::exam_sheets::delete_by_id(&mut *tx, sheet_id).await? {
        return Err(GradingError::NotFound("Exam sheet"));
    }

    tx.commit().await?;
    Ok(SheetRemoval { removed_exams })
}

pub(crate) struct NewAnswer<'a> {
    pub(crate) task_id: &'a str,
    pub(crate) candidate_id: &'a str,
    pub(crate) answer: &'a str,
}

#[derive(Default)]
pub(crate) struct AnswerChanges<'a> {
    pub(crate) answer: Option<&'a str>,
    pub(crate) assigned_points: Option<i32>,
}

#[derive(Debug)]
pub(crate) struct AnswerWrite {
    pub(crate) answer: Answer,
    pub(crate) achieved_points: i64,
}

pub(crate) async fn create_answer(
    pool: &PgPool,
    exam_id: &str,
    params: NewAnswer<'_>,
) -> Result<AnswerWrite, GradingError> {
    let mut tx = pool.begin().await?;

    let exam = repositories::exams::lock_for_update(&mut *tx, exam_id)
        .await?
        .ok_or(GradingError::NotFound("Exam"))?;
    let task = repositories::tasks::find_for_share(&mut *tx, params.task_id).await?;
    check_answer_task_reference(
        &exam.exam_sheet_id,
        task.as_ref().map(|task| task.exam_sheet_id.as_str()),
    )
    .into_result()?;

    let answer_id = Uuid::new_v4().to_string();
    let answer = repositories::answers::create(
        &mut *tx,
        repositories::answers::CreateAnswer {
            id: &answer_id,
            exam_id,
            task_id: params.task_id,
            user_id: params.candidate_id,
            answer: params.answer,
            now: utc_now(),
        },
    )
    .await
    .map_err(|err| match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => GradingError::Conflict(
            "An answer to this task already exists in this exam.".to_string(),
        ),
        other => GradingError::Database(other),
    })?;

    let achieved_points = aggregates::recompute_exam_achieved_points(&mut *tx, exam_id).await?;

    tx.commit().await?;
    Ok(AnswerWrite { answer, achieved_points })
}

pub(crate) async fn update_answer(
    pool: &PgPool,
    exam_id: &str,
    answer_id: &str,
    changes: AnswerChanges<'_>,
) -> Result<AnswerWrite, GradingError> {
    let mut tx = pool.begin().await?;

    repositories::exams::lock_for_update(&mut *tx, exam_id)
        .await?
        .ok_or(GradingError::NotFound("Exam"))?;
    let current = repositories::answers::lock_in_exam(&mut *tx, exam_id, answer_id)
        .await?
        .ok_or(GradingError::NotFound("Answer"))?;

    if let Some(points) = changes.assigned_points {
        let task = repositories::tasks::find_for_share(&mut *tx, &current.task_id)
            .await?
            .ok_or_else(|| {
                GradingError::Invalid(FieldErrors::single(
                    "task",
                    "The answered task no longer exists.",
                ))
            })?;
        check_assigned_points(points, task.max_points).into_result()?;
    }

    let answer = repositories::answers::update(
        &mut *tx,
        answer_id,
        changes.answer.unwrap_or(&current.answer),
        changes.assigned_points.unwrap_or(current.assigned_points),
        utc_now(),
    )
    .await?;

    let achieved_points = aggregates::recompute_exam_achieved_points(&mut *tx, exam_id).await?;

    tx.commit().await?;
    Ok(AnswerWrite { answer, achieved_points })
}

pub(crate) async fn delete_answer(
    pool: &PgPool,
    exam_id: &str,
    answer_id: &str,
) -> Result<i64, GradingError> {
    let mut tx = pool.begin().await?;

    repositories::exams::lock_for_update(&mut *tx, exam_id)
        .await?
        .ok_or(GradingError::NotFound("Exam"))?;
    repositories::answers::lock_in_exam(&mut *tx, exam_id, answer_id)
        .await?
        .ok_or(GradingError::NotFound("Answer"))?;

    repositories::answers::delete_by_id(&mut *tx, answer_id).await?;
    let achieved_points = aggregates::recompute_exam_achieved_points(&mut *tx, exam_id).await?;

    tx.commit().await?;
    Ok(achieved_points)
}

#[cfg(test)]
mod tests {
    use tokio::task::JoinHandle;

    use super::*;
    use crate::test_support;

    async fn install_failing_trigger(pool: &PgPool, table: &str, event: &str) {
        sqlx::query(
            "CREATE OR REPLACE FUNCTION fail_write() RETURNS trigger LANGUAGE plpgsql AS $$
             BEGIN
                 RAISE EXCEPTION 'write rejected';
             END
             $$",
        )
        .execute(pool)
        .await
        .expect("create trigger function");
        sqlx::query(&format!(
            "CREATE TRIGGER fail_write BEFORE {event} ON {table}
             FOR EACH ROW EXECUTE FUNCTION fail_write()",
        ))
        .execute(pool)
        .await
        .expect("create trigger");
    }

    #[tokio::test]
    async fn concurrent_task_and_answer_writes_keep_totals_exact() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();

        let owner = test_support::insert_examinator(db, "owner").await;
        let candidate = test_support::insert_candidate(db, "candidate").await;
        let sheet = test_support::insert_sheet(db, &owner.id, "Final").await;
        let exam = test_support::insert_exam(db, &sheet.id, &candidate.id).await;

        let mut answered = Vec::new();
        for _ in 0..4 {
            answered.push(test_support::insert_task(db, &sheet.id, 10).await);
        }
        let mut doomed = Vec::new();
        for _ in 0..4 {
            let task = test_support::insert_task(db, &sheet.id, 7).await;
            test_support::insert_graded_answer(db, &exam, &task.id, 2).await;
            doomed.push(task);
        }

        let mut handles: Vec<JoinHandle<Result<(), GradingError>>> = Vec::new();
        for _ in 0..10 {
            let pool = db.clone();
            let sheet_id = sheet.id.clone();
            handles.push(tokio::spawn(async move {
                create_task(&pool, &sheet_id, NewTask { question: "Added", max_points: 5 })
                    .await
                    .map(|_| ())
            }));
        }
        for task in &answered {
            let pool = db.clone();
            let exam_id = exam.id.clone();
            let candidate_id = candidate.id.clone();
            let task_id = task.id.clone();
            handles.push(tokio::spawn(async move {
                let created = create_answer(
                    &pool,
                    &exam_id,
                    NewAnswer { task_id: &task_id, candidate_id: &candidate_id, answer: "x" },
                )
                .await?;
                update_answer(
                    &pool,
                    &exam_id,
                    &created.answer.id,
                    AnswerChanges { answer: None, assigned_points: Some(3) },
                )
                .await?;
                Ok::<(), GradingError>(())
            }));
        }
        for task in &doomed {
            let pool = db.clone();
            let sheet_id = sheet.id.clone();
            let task_id = task.id.clone();
            handles.push(tokio::spawn(async move {
                delete_task(&pool, &sheet_id, &task_id).await.map(|_| ())
            }));
        }

        for handle in handles {
            handle.await.expect("join").expect("concurrent write");
        }

        assert_eq!(test_support::sheet_max_points(db, &sheet.id).await, 10 * 5 + 4 * 10);
        assert_eq!(test_support::exam_achieved_points(db, &exam.id).await, 4 * 3);
        assert_eq!(test_support::count_rows(db, "answers").await, 4);
        test_support::assert_all_aggregates_consistent(db).await;
    }

    #[tokio::test]
    async fn failed_task_delete_keeps_answers_and_totals() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();

        let owner = test_support::insert_examinator(db, "owner").await;
        let candidate = test_support::insert_candidate(db, "candidate").await;
        let sheet = test_support::insert_sheet(db, &owner.id, "Final").await;
        let exam = test_support::insert_exam(db, &sheet.id, &candidate.id).await;
        let task = test_support::insert_task(db, &sheet.id, 8).await;
        test_support::insert_graded_answer(db, &exam, &task.id, 6).await;

        // Answers are deleted before the task row, so this fails mid-workflow.
        install_failing_trigger(db, "tasks", "DELETE").await;

        let err = delete_task(db, &sheet.id, &task.id).await.expect_err("delete must fail");
        assert!(matches!(err, GradingError::Database(_)), "unexpected error: {err:?}");

        assert_eq!(test_support::count_rows(db, "answers").await, 1);
        assert_eq!(test_support::count_rows(db, "tasks").await, 1);
        assert_eq!(test_support::sheet_max_points(db, &sheet.id).await, 8);
        assert_eq!(test_support::exam_achieved_points(db, &exam.id).await, 6);
    }

    #[tokio::test]
    async fn failed_recompute_rolls_back_the_answer() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();

        let owner = test_support::insert_examinator(db, "owner").await;
        let candidate = test_support::insert_candidate(db, "candidate").await;
        let sheet = test_support::insert_sheet(db, &owner.id, "Final").await;
        let exam = test_support::insert_exam(db, &sheet.id, &candidate.id).await;
        let task = test_support::insert_task(db, &sheet.id, 8).await;

        install_failing_trigger(db, "exams", "UPDATE").await;

        let err = create_answer(
            db,
            &exam.id,
            NewAnswer { task_id: &task.id, candidate_id: &candidate.id, answer: "x" },
        )
        .await
        .expect_err("recompute must fail");
        assert!(
            matches!(err, GradingError::Consistency(aggregates::ConsistencyError::Database(_))),
            "unexpected error: {err:?}"
        );

        assert_eq!(test_support::count_rows(db, "answers").await, 0);
        assert_eq!(test_support::exam_achieved_points(db, &exam.id).await, 0);
    }

    #[tokio::test]
    async fn deleting_sheet_removes_only_its_own_rows() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();

        let owner = test_support::insert_examinator(db, "owner").await;
        let candidate = test_support::insert_candidate(db, "candidate").await;

        let doomed = test_support::insert_sheet(db, &owner.id, "Old").await;
        let doomed_exam = test_support::insert_exam(db, &doomed.id, &candidate.id).await;
        let doomed_task = test_support::insert_task(db, &doomed.id, 4).await;
        test_support::insert_graded_answer(db, &doomed_exam, &doomed_task.id, 4).await;

        let kept = test_support::insert_sheet(db, &owner.id, "New").await;
        let kept_exam = test_support::insert_exam(db, &kept.id, &candidate.id).await;
        let kept_task = test_support::insert_task(db, &kept.id, 9).await;
        test_support::insert_graded_answer(db, &kept_exam, &kept_task.id, 5).await;

        let removal = delete_sheet(db, &doomed.id).await.expect("delete sheet");
        assert_eq!(removal.removed_exams, 1);

        for table in ["exam_sheets", "tasks", "exams", "answers"] {
            assert_eq!(test_support::count_rows(db, table).await, 1, "table {table}");
        }
        assert_eq!(test_support::exam_achieved_points(db, &kept_exam.id).await, 5);
        test_support::assert_all_aggregates_consistent(db).await;

        let err = delete_sheet(db, &doomed.id).await.expect_err("already deleted");
        assert!(matches!(err, GradingError::NotFound("Exam sheet")));
    }
}
