use sqlx::PgPool;

use crate::db::models::User;

const COLUMNS: &str = "id, username, full_name, is_examinator, is_active, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg_attr(not(test), allow(dead_code))]
pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) username: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) is_examinator: bool,
    pub(crate) is_active: bool,
    pub(crate) now: time::PrimitiveDateTime,
}

/// Users are provisioned by the identity layer; this service only mirrors them.
#[cfg_attr(not(test), allow(dead_code))]
pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, username, full_name, is_examinator, is_active, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.username)
    .bind(params.full_name)
    .bind(params.is_examinator)
    .bind(params.is_active)
    .bind(params.now)
    .fetch_one(pool)
    .await
}
