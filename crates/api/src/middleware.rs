use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use eggs_auth::{AccessPolicy, JwtValidator, Principal};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub policy: Arc<AccessPolicy>,
}

/// Authenticate the bearer token (if any), then authorize the request.
///
/// A token that is present but invalid is rejected even on public paths.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let principal = match extract_bearer(req.headers()) {
        Ok(None) => None,
        Ok(Some(token)) => match state.jwt.validate(token).await {
            Ok(claims) => Some(Principal::from_claims(&claims)),
            Err(e) => {
                tracing::debug!(error = %e, "bearer token rejected");
                return errors::unauthorized(e.to_string());
            }
        },
        Err(response) => return response,
    };

    if let Err(response) = crate::authz::authorize_request(
        &state.policy,
        req.method(),
        req.uri().path(),
        principal.as_ref(),
    ) {
        return response;
    }

    if let Some(principal) = principal {
        req.extensions_mut().insert(PrincipalContext::new(principal));
    }

    next.run(req).await
}

/// Bearer token from the `Authorization` header.
///
/// No header, or a non-bearer scheme, means "no token"; a bearer header with
/// an empty or non-ASCII value is rejected outright.
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, Response> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| errors::unauthorized("malformed authorization header"))?;

    let Some(token) = strip_bearer_scheme(header) else {
        return Ok(None);
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(errors::unauthorized("empty bearer token"));
    }

    Ok(Some(token))
}

fn strip_bearer_scheme(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(rest)
}
