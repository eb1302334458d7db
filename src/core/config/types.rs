use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Process configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(super) environment: Environment,
    pub(super) strict: bool,
    pub(super) listen: ListenAddr,
    pub(super) service: ServiceSettings,
    pub(super) auth: AuthSettings,
    pub(super) database: DatabaseSettings,
    pub(super) observability: ObservabilitySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListenAddr {
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServiceSettings {
    pub(crate) name: String,
    pub(crate) version: String,
    /// Mount point of the JSON API, e.g. `/api/v1`. Never `/` and never with a
    /// trailing slash.
    pub(crate) api_prefix: String,
    pub(crate) cors_origins: Vec<String>,
}

/// Verification side of the actor tokens. Tokens are minted elsewhere with
/// the same shared secret.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) secret: String,
    pub(crate) secret_source: SecretSource,
    pub(crate) algorithm: Algorithm,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &"<redacted>")
            .field("secret_source", &self.secret_source)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SecretSource {
    Environment,
    /// Generated on first start and persisted so restarts keep accepting
    /// tokens. Development only.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) url: String,
    pub(crate) max_connections: u32,
    pub(crate) acquire_timeout: Duration,
}

#[derive(Debug, Clone)]
pub(crate) struct ObservabilitySettings {
    pub(crate) log_filter: String,
    pub(crate) log_format: LogFormat,
    pub(crate) metrics_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    pub(super) fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("production" | "prod") => Self::Production,
            Some("staging") => Self::Staging,
            Some("test" | "testing") => Self::Test,
            _ => Self::Development,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub(super) fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("invalid BACKEND_CORS_ORIGINS: {0}")]
    InvalidOrigins(String),
    #[error("{0} must be set explicitly in strict mode")]
    MissingSecret(&'static str),
}
