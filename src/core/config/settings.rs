use std::path::PathBuf;
use std::time::Duration;

use super::parsing::{parse_algorithm, parse_api_prefix, parse_origins, Vars};
use super::secret::{default_secret_path, load_or_create_at};
use super::types::{
    AuthSettings, ConfigError, DatabaseSettings, Environment, ListenAddr, LogFormat,
    ObservabilitySettings, SecretSource, ServiceSettings, Settings,
};

impl Settings {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Production implies strict mode. Strict mode refuses to start on
    /// development fallbacks for secrets.
    pub(crate) fn from_lookup(
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let vars = Vars::new(lookup);

        let environment =
            Environment::parse(vars.first(&["EXAMSHEETS_ENV", "ENVIRONMENT"]).as_deref());
        let strict = vars.flag("EXAMSHEETS_STRICT_CONFIG") || environment.is_production();

        let listen = ListenAddr {
            host: vars.text("EXAMSHEETS_HOST", "0.0.0.0"),
            port: vars.number("EXAMSHEETS_PORT", 8000)?,
        };
        if listen.port == 0 {
            return Err(ConfigError::InvalidValue { field: "EXAMSHEETS_PORT", value: "0".into() });
        }

        let service = ServiceSettings {
            name: vars.text("PROJECT_NAME", "Exam Sheets API"),
            version: vars.text("VERSION", env!("CARGO_PKG_VERSION")),
            api_prefix: parse_api_prefix(vars.text("API_V1_STR", "/api/v1"))?,
            cors_origins: parse_origins(vars.get("BACKEND_CORS_ORIGINS"))?,
        };

        let auth = load_auth(&vars, strict)?;
        let database = load_database(&vars, strict)?;

        let observability = ObservabilitySettings {
            log_filter: vars.text("EXAMSHEETS_LOG_LEVEL", "info"),
            log_format: if vars.flag("EXAMSHEETS_LOG_JSON") {
                LogFormat::Json
            } else {
                LogFormat::Compact
            },
            metrics_enabled: vars.flag("PROMETHEUS_ENABLED"),
        };

        Ok(Self { environment, strict, listen, service, auth, database, observability })
    }

    pub(crate) fn environment(&self) -> Environment {
        self.environment
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn listen(&self) -> &ListenAddr {
        &self.listen
    }

    pub(crate) fn service(&self) -> &ServiceSettings {
        &self.service
    }

    pub(crate) fn auth(&self) -> &AuthSettings {
        &self.auth
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn observability(&self) -> &ObservabilitySettings {
        &self.observability
    }
}

fn load_auth(vars: &Vars<'_>, strict: bool) -> Result<AuthSettings, ConfigError> {
    let algorithm = parse_algorithm(&vars.text("ALGORITHM", "HS256"))?;

    let (secret, secret_source) = match vars.get("SECRET_KEY") {
        Some(secret) => (secret, SecretSource::Environment),
        None if strict => return Err(ConfigError::MissingSecret("SECRET_KEY")),
        None => {
            let path = vars
                .get("EXAMSHEETS_SECRET_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_secret_path);
            (load_or_create_at(&path), SecretSource::File(path))
        }
    };

    Ok(AuthSettings { secret, secret_source, algorithm })
}

fn load_database(vars: &Vars<'_>, strict: bool) -> Result<DatabaseSettings, ConfigError> {
    let max_connections: u32 = vars.number("DB_MAX_CONNECTIONS", 20)?;
    if max_connections == 0 {
        return Err(ConfigError::InvalidValue { field: "DB_MAX_CONNECTIONS", value: "0".into() });
    }
    let acquire_timeout = Duration::from_secs(vars.number("DB_ACQUIRE_TIMEOUT_SECONDS", 30)?);

    let url = match vars.get("DATABASE_URL") {
        Some(url) => url,
        None => {
            let password = vars.get("POSTGRES_PASSWORD");
            if strict && password.is_none() {
                return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
            }
            format!(
                "postgresql://{}:{}@{}:{}/{}",
                vars.text("POSTGRES_USER", "examsheets"),
                password.unwrap_or_default(),
                vars.text("POSTGRES_SERVER", "localhost"),
                vars.number::<u16>("POSTGRES_PORT", 5432)?,
                vars.text("POSTGRES_DB", "examsheets"),
            )
        }
    };

    Ok(DatabaseSettings { url, max_connections, acquire_timeout })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
        Settings::from_lookup(&|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_cover_local_development() {
        let settings = load(&[("SECRET_KEY", "dev")]).expect("settings");

        assert_eq!(settings.environment(), Environment::Development);
        assert!(!settings.is_strict());
        assert_eq!(settings.listen().to_string(), "0.0.0.0:8000");
        assert_eq!(settings.service().api_prefix, "/api/v1");
        assert_eq!(settings.auth().secret_source, SecretSource::Environment);
        assert_eq!(
            settings.database().url,
            "postgresql://examsheets:@localhost:5432/examsheets"
        );
        assert_eq!(settings.database().acquire_timeout, Duration::from_secs(30));
        assert_eq!(settings.observability().log_format, LogFormat::Compact);
        assert!(!settings.observability().metrics_enabled);
    }

    #[test]
    fn explicit_database_url_wins() {
        let settings = load(&[
            ("SECRET_KEY", "dev"),
            ("DATABASE_URL", "postgresql://u:p@db:6543/sheets"),
            ("POSTGRES_SERVER", "ignored"),
        ])
        .expect("settings");

        assert_eq!(settings.database().url, "postgresql://u:p@db:6543/sheets");
    }

    #[test]
    fn strict_mode_requires_explicit_secrets() {
        let err = load(&[("EXAMSHEETS_STRICT_CONFIG", "1"), ("POSTGRES_PASSWORD", "pw")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("SECRET_KEY")));

        let err = load(&[("EXAMSHEETS_STRICT_CONFIG", "1"), ("SECRET_KEY", "s")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("POSTGRES_PASSWORD")));

        let settings = load(&[
            ("EXAMSHEETS_STRICT_CONFIG", "yes"),
            ("SECRET_KEY", "s"),
            ("POSTGRES_PASSWORD", "pw"),
        ])
        .expect("strict settings");
        assert!(settings.is_strict());
    }

    #[test]
    fn production_implies_strict() {
        let err = load(&[("EXAMSHEETS_ENV", "prod"), ("DATABASE_URL", "postgresql://x")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("SECRET_KEY")));
    }

    #[test]
    fn rejects_unusable_values() {
        let cases = [
            ("DB_MAX_CONNECTIONS", "0"),
            ("EXAMSHEETS_PORT", "0"),
            ("EXAMSHEETS_PORT", "http"),
            ("API_V1_STR", "/"),
            ("ALGORITHM", "none"),
        ];
        for (key, value) in cases {
            let err = load(&[("SECRET_KEY", "s"), (key, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { field, .. } if field == key),
                "{key}={value}: {err}"
            );
        }
    }

    #[test]
    fn debug_output_hides_secret() {
        let settings = load(&[("SECRET_KEY", "very-secret-value")]).expect("settings");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("very-secret-value"));
    }
}
