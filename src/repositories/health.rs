use std::time::{Duration, Instant};

use sqlx::PgPool;

pub(crate) struct DatabaseProbe {
    pub(crate) round_trip: Duration,
    pub(crate) applied_migrations: i64,
}

/// One round trip that also proves the schema was migrated.
pub(crate) async fn probe(pool: &PgPool) -> Result<DatabaseProbe, sqlx::Error> {
    let started = Instant::now();
    let applied_migrations: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await?;

    Ok(DatabaseProbe { round_trip: started.elapsed(), applied_migrations })
}
