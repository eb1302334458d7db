//! Derived point totals.
//!
//! `exam_sheets.max_points` and `exams.achieved_points` are caches of sums over
//! their children. They are only written here, always as a full re-sum inside
//! the transaction that changed the children, so a committed state never holds
//! a stale total.

use sqlx::PgPool;
use thiserror::Error;

use crate::core::metrics;

pub(crate) const SHEET_AGGREGATE: &str = "exam_sheet_max_points";
pub(crate) const EXAM_AGGREGATE: &str = "exam_achieved_points";

#[derive(Debug, Error)]
pub(crate) enum ConsistencyError {
    /// The root vanished between locking and recomputing. Never expected while
    /// the caller holds the root's row lock.
    #[error("{kind} {id} disappeared during recomputation")]
    MissingRoot { kind: &'static str, id: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Cached total next to the freshly summed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AggregateCheck {
    pub(crate) cached: i64,
    pub(crate) actual: i64,
}

impl AggregateCheck {
    pub(crate) fn is_consistent(&self) -> bool {
        self.cached == self.actual
    }
}

pub(crate) async fn recompute_sheet_max_points(
    executor: impl sqlx::PgExecutor<'_>,
    sheet_id: &str,
) -> Result<i64, ConsistencyError> {
    let total = sqlx::query_scalar::<_, i64>(
        "UPDATE exam_sheets
         SET max_points = (
                SELECT COALESCE(SUM(t.max_points), 0)::BIGINT
                FROM tasks t
                WHERE t.exam_sheet_id = $1
             ),
             updated_at = (now() AT TIME ZONE 'UTC')
         WHERE id = $1
         RETURNING max_points",
    )
    .bind(sheet_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| ConsistencyError::MissingRoot {
        kind: "exam sheet",
        id: sheet_id.to_string(),
    })?;

    metrics::record_recomputation(SHEET_AGGREGATE);
    tracing::debug!(sheet_id, max_points = total, "Recomputed exam sheet max points");
    Ok(total)
}

pub(crate) async fn recompute_exam_achieved_points(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
) -> Result<i64, ConsistencyError> {
    let total = sqlx::query_scalar::<_, i64>(
        "UPDATE exams
         SET achieved_points = (
                SELECT COALESCE(SUM(a.assigned_points), 0)::BIGINT
                FROM answers a
                WHERE a.exam_id = $1
             ),
             updated_at = (now() AT TIME ZONE 'UTC')
         WHERE id = $1
         RETURNING achieved_points",
    )
    .bind(exam_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| ConsistencyError::MissingRoot { kind: "exam", id: exam_id.to_string() })?;

    metrics::record_recomputation(EXAM_AGGREGATE);
    tracing::debug!(exam_id, achieved_points = total, "Recomputed exam achieved points");
    Ok(total)
}

/// Recomputes every listed exam on the same connection, in the given order.
pub(crate) async fn recompute_exams(
    conn: &mut sqlx::PgConnection,
    exam_ids: &[String],
) -> Result<(), ConsistencyError> {
    for exam_id in exam_ids {
        recompute_exam_achieved_points(&mut *conn, exam_id).await?;
    }
    Ok(())
}

/// Compares a sheet's cached maximum with the live sum without writing.
/// Returns `None` when the sheet does not exist.
pub(crate) async fn verify_sheet(
    pool: &PgPool,
    sheet_id: &str,
) -> Result<Option<AggregateCheck>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, i64)>(
        "SELECT s.max_points,
                (SELECT COALESCE(SUM(t.max_points), 0)::BIGINT
                 FROM tasks t
                 WHERE t.exam_sheet_id = s.id)
         FROM exam_sheets s
         WHERE s.id = $1",
    )
    .bind(sheet_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(cached, actual)| report(SHEET_AGGREGATE, sheet_id, cached, actual)))
}

pub(crate) async fn verify_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Option<AggregateCheck>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, i64)>(
        "SELECT e.achieved_points,
                (SELECT COALESCE(SUM(a.assigned_points), 0)::BIGINT
                 FROM answers a
                 WHERE a.exam_id = e.id)
         FROM exams e
         WHERE e.id = $1",
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(cached, actual)| report(EXAM_AGGREGATE, exam_id, cached, actual)))
}

fn report(aggregate: &'static str, id: &str, cached: i64, actual: i64) -> AggregateCheck {
    let check = AggregateCheck { cached, actual };
    if !check.is_consistent() {
        metrics::record_drift(aggregate);
        tracing::warn!(aggregate, id, cached, actual, "Aggregate drift detected");
    }
    check
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_compares_cached_and_actual() {
        assert!(AggregateCheck { cached: 7, actual: 7 }.is_consistent());
        assert!(!AggregateCheck { cached: 7, actual: 5 }.is_consistent());
    }

    #[test]
    fn report_keeps_both_totals() {
        let check = report(EXAM_AGGREGATE, "exam-1", 3, 4);
        assert_eq!(check, AggregateCheck { cached: 3, actual: 4 });
    }
}
