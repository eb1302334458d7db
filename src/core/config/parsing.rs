use std::str::FromStr;

use jsonwebtoken::Algorithm;

use super::types::ConfigError;

const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

/// Configuration values behind a lookup function. Values are trimmed and
/// empty strings count as unset.
pub(super) struct Vars<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl<'a> Vars<'a> {
    pub(super) fn new(lookup: &'a dyn Fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }

    pub(super) fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
    }

    /// First key that is set wins.
    pub(super) fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub(super) fn text(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub(super) fn number<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue { field: key, value: raw }),
        }
    }

    pub(super) fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| is_truthy(&value))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Accepts a JSON array or a comma separated list. Nothing configured means
/// the local frontend dev servers.
pub(super) fn parse_origins(raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = match raw {
        None => Vec::new(),
        Some(raw) if raw.starts_with('[') => {
            serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidOrigins(raw))?
        }
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect(),
    };

    if origins.is_empty() {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|origin| origin.to_string()).collect());
    }
    Ok(origins)
}

/// Only the shared-secret HMAC family is supported.
pub(super) fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::InvalidValue { field: "ALGORITHM", value: value.to_string() }),
    }
}

pub(super) fn parse_api_prefix(value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim_end_matches('/');
    if !value.starts_with('/') || trimmed.is_empty() {
        return Err(ConfigError::InvalidValue { field: "API_V1_STR", value });
    }
    Ok(trimmed.to_string())
}
