//! Token verification against a remote JSON Web Key Set.
//!
//! Keys are cached in-process. The cache is refreshed when it is older than
//! the configured interval, and when a token names a `kid` the cached set does
//! not contain (key rotation). Rotation refetches are rate limited, and every
//! refresh happens under the cache write lock so concurrent callers share one
//! fetch.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use eggs_auth::{JwtClaims, JwtValidator, TokenValidationError, validation_for};

/// Minimum spacing between refetches triggered by an unknown `kid`.
pub const MIN_ROTATION_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct CachedKeys {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
    /// Last refetch caused by an unknown `kid`.
    rotation_refetch_at: Option<Instant>,
}

pub struct JwksValidator {
    uri: String,
    client: reqwest::Client,
    refresh_after: Duration,
    audience: Option<String>,
    cache: RwLock<Option<CachedKeys>>,
}

impl JwksValidator {
    pub fn new(uri: impl Into<String>, refresh_after: Duration) -> Self {
        Self {
            uri: uri.into(),
            client: reqwest::Client::new(),
            refresh_after,
            audience: None,
            cache: RwLock::new(None),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    async fn fetch(&self) -> Result<Arc<JwkSet>, TokenValidationError> {
        let key_source = |e: reqwest::Error| TokenValidationError::KeySource(e.to_string());

        let fetched = async {
            self.client
                .get(&self.uri)
                .send()
                .await
                .map_err(key_source)?
                .error_for_status()
                .map_err(key_source)?
                .json::<JwkSet>()
                .await
                .map_err(key_source)
        }
        .await;

        match fetched {
            Ok(keys) => {
                tracing::info!(uri = %self.uri, keys = keys.keys.len(), "jwks refreshed");
                Ok(Arc::new(keys))
            }
            Err(e) => {
                tracing::warn!(uri = %self.uri, error = %e, "jwks refresh failed");
                Err(e)
            }
        }
    }

    fn is_fresh(&self, cached: &CachedKeys) -> bool {
        cached.fetched_at.elapsed() < self.refresh_after
    }

    async fn cached_keys(&self) -> Result<Arc<JwkSet>, TokenValidationError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if self.is_fresh(cached) {
                return Ok(cached.keys.clone());
            }
        }

        let mut cache = self.cache.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if self.is_fresh(cached) {
                return Ok(cached.keys.clone());
            }
        }

        let keys = self.fetch().await?;
        let rotation_refetch_at = cache.as_ref().and_then(|c| c.rotation_refetch_at);
        *cache = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
            rotation_refetch_at,
        });
        Ok(keys)
    }

    async fn signing_key(&self, kid: Option<&str>) -> Result<Jwk, TokenValidationError> {
        let unknown = || TokenValidationError::UnknownKey(kid.unwrap_or("<none>").to_string());

        let keys = self.cached_keys().await?;
        if let Some(jwk) = select_key(&keys, kid) {
            return Ok(jwk.clone());
        }

        // Unknown kid: the issuer may have rotated keys since the last fetch.
        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref() {
            if let Some(jwk) = select_key(&cached.keys, kid) {
                return Ok(jwk.clone());
            }
            if cached
                .rotation_refetch_at
                .is_some_and(|at| at.elapsed() < MIN_ROTATION_REFETCH_INTERVAL)
            {
                tracing::debug!(kid = ?kid, "unknown kid; rotation refetch rate limited");
                return Err(unknown());
            }
        }

        let keys = self.fetch().await?;
        let now = Instant::now();
        *cache = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: now,
            rotation_refetch_at: Some(now),
        });
        select_key(&keys, kid).cloned().ok_or_else(unknown)
    }
}

fn select_key<'a>(keys: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => keys.find(kid),
        None if keys.keys.len() == 1 => keys.keys.first(),
        None => None,
    }
}

/// A key that names its algorithm only verifies tokens signed with it.
fn check_pinned_algorithm(jwk: &Jwk, token_alg: Algorithm) -> Result<(), TokenValidationError> {
    let Some(pinned) = jwk.common.key_algorithm else {
        return Ok(());
    };

    match Algorithm::from_str(&pinned.to_string()) {
        Ok(alg) if alg == token_alg => Ok(()),
        _ => Err(TokenValidationError::Rejected(format!(
            "token alg {token_alg:?} does not match key alg {pinned}"
        ))),
    }
}

#[async_trait]
impl JwtValidator for JwksValidator {
    async fn validate(&self, token: &str) -> Result<JwtClaims, TokenValidationError> {
        let header = jsonwebtoken::decode_header(token)?;
        let jwk = self.signing_key(header.kid.as_deref()).await?;
        check_pinned_algorithm(&jwk, header.alg)?;
        let key = DecodingKey::from_jwk(&jwk)?;

        // The key family is checked against `alg` while verifying.
        let validation = validation_for(header.alg, self.audience.as_deref());
        let data = jsonwebtoken::decode::<JwtClaims>(token, &key, &validation)?;
        Ok(data.claims)
    }
}
