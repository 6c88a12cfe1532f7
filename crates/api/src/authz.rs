//! API-side authorization guard.
//!
//! Evaluates the access policy for the current request before any handler
//! runs, so a rejected request never reaches the record service.

use axum::http::Method;
use axum::response::Response;

use eggs_auth::{AccessPolicy, AuthzError, Principal};

use crate::app::errors;

/// Check the request line against the policy, mapping failures to 401/403.
pub fn authorize_request(
    policy: &AccessPolicy,
    method: &Method,
    path: &str,
    principal: Option<&Principal>,
) -> Result<(), Response> {
    policy
        .authorize(method.as_str(), path, principal)
        .map_err(|e| {
            tracing::debug!(%method, path, error = %e, "request not authorized");
            match e {
                AuthzError::Unauthenticated => errors::unauthorized(e.to_string()),
                AuthzError::Forbidden(_) => errors::forbidden(e.to_string()),
            }
        })
}
