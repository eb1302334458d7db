//! Verification of actor tokens. Tokens are minted by the identity layer with
//! the shared `SECRET_KEY`; the subject is the user id.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum SecurityError {
    #[cfg_attr(not(test), allow(dead_code))]
    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    pub(crate) exp: i64,
}

pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<Claims, SecurityError> {
    let auth = settings.auth();
    let mut validation = Validation::new(auth.algorithm);
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(token, &DecodingKey::from_secret(auth.secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(SecurityError::Rejected)
}

/// Signs a token the way the identity layer does.
#[cfg(test)]
pub(crate) fn create_access_token(
    subject: &str,
    settings: &Settings,
    expires_in: time::Duration,
) -> Result<String, SecurityError> {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let auth = settings.auth();
    let claims = Claims {
        sub: subject.to_string(),
        exp: (time::OffsetDateTime::now_utc() + expires_in).unix_timestamp(),
    };

    encode(&Header::new(auth.algorithm), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(SecurityError::Encoding)
}
