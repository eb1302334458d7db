use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;

/// Shared by every handler. `PgPool` is already a handle, so only the
/// settings need the `Arc`.
#[derive(Clone)]
pub(crate) struct AppState {
    settings: Arc<Settings>,
    db: PgPool,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        Self { settings: Arc::new(settings), db }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.db
    }
}
