use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::{LogFormat, ObservabilitySettings};

/// Installs the global subscriber. `RUST_LOG`, when set, overrides
/// `EXAMSHEETS_LOG_LEVEL`.
pub(crate) fn init_tracing(settings: &ObservabilitySettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_filter)
            .with_context(|| format!("invalid log filter {:?}", settings.log_filter))?,
    };

    let subscriber = fmt().with_env_filter(filter).with_target(false);
    let installed = match settings.log_format {
        LogFormat::Json => subscriber.json().with_current_span(true).flatten_event(true).try_init(),
        LogFormat::Compact => subscriber.compact().try_init(),
    };

    installed.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
