//! Environment-driven settings. `Settings::from_env` is the production entry
//! point; `Settings::from_lookup` takes any key lookup.

mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::{
    DatabaseSettings, LogFormat, ObservabilitySettings, SecretSource, Settings,
};
