//! Bearer token verification seam.
//!
//! The API only depends on [`JwtValidator`]. Production wiring verifies
//! against a remote key set (see `eggs-infra`); the HS256 validator here
//! backs local development and tests.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::{JwtClaims, TokenValidationError};

#[async_trait]
pub trait JwtValidator: Send + Sync {
    /// Verify signature and registered claims, returning the decoded claims.
    async fn validate(&self, token: &str) -> Result<JwtClaims, TokenValidationError>;
}

/// Validation settings shared by every validator: `exp` required; when an
/// audience is configured, `aud` is required too and must match it.
pub fn validation_for(algorithm: Algorithm, audience: Option<&str>) -> Validation {
    let mut validation = Validation::new(algorithm);
    match audience {
        Some(aud) => {
            validation.set_audience(&[aud]);
            validation.set_required_spec_claims(&["exp", "aud"]);
        }
        None => validation.validate_aud = false,
    }
    validation
}

pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation: validation_for(Algorithm::HS256, None),
        }
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation = validation_for(Algorithm::HS256, Some(audience));
        self
    }
}

#[async_trait]
impl JwtValidator for Hs256JwtValidator {
    async fn validate(&self, token: &str) -> Result<JwtClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}
