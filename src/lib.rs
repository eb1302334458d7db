pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use anyhow::Context;

use crate::core::config::{SecretSource, Settings};
use crate::core::state::AppState;

/// Loads configuration, prepares the database and serves until a shutdown
/// signal arrives.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("invalid configuration")?;
    core::telemetry::init_tracing(settings.observability())?;
    core::metrics::init(settings.observability().metrics_enabled)?;

    if let SecretSource::File(path) = &settings.auth().secret_source {
        tracing::warn!(path = %path.display(), "SECRET_KEY not set, using the development key file");
    }

    let pool = db::connect(settings.database()).await.context("database unreachable")?;
    db::migrate(&pool).await.context("failed to apply migrations")?;

    serve(AppState::new(settings, pool)).await
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let settings = state.settings();
    let listener = tokio::net::TcpListener::bind(settings.listen().to_string())
        .await
        .with_context(|| format!("failed to bind {}", settings.listen()))?;

    tracing::info!(
        addr = %settings.listen(),
        environment = settings.environment().as_str(),
        strict = settings.is_strict(),
        api_prefix = %settings.service().api_prefix,
        "Exam sheets API listening"
    );

    let app = api::router::router(state.clone());
    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    state.db().close().await;
    tracing::info!("Database pool closed");
    Ok(())
}
