//! Origin-checked CORS.
//!
//! Only allowed origins ever see `Access-Control-*` headers: the
//! [`CorsLayer`] wraps a request only after [`CorsPolicy::is_allowed`] has
//! accepted its `Origin`. Everything else passes through untouched.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use regex::Regex;
use tower::{Layer, ServiceExt};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

pub const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

static GITPOD_ORIGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://4200-[a-z0-9\-]+\.ws-[a-z0-9]+\.gitpod\.io$")
        .expect("gitpod origin pattern is a valid regex")
});

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    static_origins: Arc<Vec<String>>,
}

impl CorsPolicy {
    pub fn new(static_origins: Vec<String>) -> Self {
        Self {
            static_origins: Arc::new(static_origins),
        }
    }

    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            Some(origin) => {
                self.static_origins.iter().any(|o| o == origin) || GITPOD_ORIGIN.is_match(origin)
            }
            None => false,
        }
    }

    fn allows_header(&self, origin: &HeaderValue) -> bool {
        self.is_allowed(origin.to_str().ok())
    }

    /// CORS headers for an allowed origin: echoed origin, credentials,
    /// fixed method list, mirrored request headers, one-hour preflight cache.
    pub fn layer(&self) -> CorsLayer {
        let policy = self.clone();
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(move |origin, _| {
                policy.allows_header(origin)
            }))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
            .max_age(PREFLIGHT_MAX_AGE)
    }
}

impl From<&CorsConfig> for CorsPolicy {
    fn from(config: &CorsConfig) -> Self {
        Self::new(config.allowed_origins.clone())
    }
}

#[derive(Clone)]
pub struct CorsState {
    policy: CorsPolicy,
    layer: CorsLayer,
}

impl From<CorsPolicy> for CorsState {
    fn from(policy: CorsPolicy) -> Self {
        let layer = policy.layer();
        Self { policy, layer }
    }
}

/// Route allowed-origin requests through the CORS layer; preflights from those
/// origins are answered there without reaching auth or routing.
pub async fn cors_middleware(State(state): State<CorsState>, req: Request, next: Next) -> Response {
    let allowed = req
        .headers()
        .get(header::ORIGIN)
        .is_some_and(|origin| state.policy.allows_header(origin));

    if !allowed {
        return next.run(req).await;
    }

    match state.layer.layer(next).oneshot(req).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}
