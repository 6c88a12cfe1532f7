//! HTTP application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP handlers for the record resource
//! - `docs.rs`: OpenAPI document
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use eggs_auth::{AccessPolicy, Hs256JwtValidator, JwtValidator};
use eggs_infra::{JwksValidator, PostgresEggProductionStore};
use eggs_production::{EggProductionService, EggProductionStore, InMemoryEggProductionStore};

use crate::config::{ApiConfig, TokenVerification};
use crate::cors::{self, CorsPolicy};
use crate::middleware;

pub mod docs;
pub mod errors;
pub mod routes;

pub type RecordService = EggProductionService<Arc<dyn EggProductionStore>>;

/// Build the full HTTP router from process configuration (used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let store: Arc<dyn EggProductionStore> = match &config.database {
        Some(db) => {
            let store = PostgresEggProductionStore::connect(&db.url, db.max_connections)
                .await
                .context("failed to connect to postgres")?;
            store
                .ensure_schema()
                .await
                .context("failed to prepare egg_production schema")?;
            tracing::info!(max_connections = db.max_connections, "using postgres store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; records are kept in memory only");
            Arc::new(InMemoryEggProductionStore::new())
        }
    };

    let audience = config.auth.audience.as_deref();
    let jwt: Arc<dyn JwtValidator> = match &config.auth.verification {
        TokenVerification::Jwks { uri, refresh_after } => {
            tracing::info!(%uri, "verifying bearer tokens against jwks");
            let validator = JwksValidator::new(uri.clone(), *refresh_after);
            Arc::new(match audience {
                Some(aud) => validator.with_audience(aud),
                None => validator,
            })
        }
        TokenVerification::SharedSecret(secret) => {
            let validator = Hs256JwtValidator::new(secret.as_bytes());
            Arc::new(match audience {
                Some(aud) => validator.with_audience(aud),
                None => validator,
            })
        }
    };

    Ok(router(store, jwt, CorsPolicy::from(&config.cors)))
}

/// Assemble the router around an already-built store and token validator.
pub fn router(
    store: Arc<dyn EggProductionStore>,
    jwt: Arc<dyn JwtValidator>,
    cors_policy: CorsPolicy,
) -> Router {
    let service: Arc<RecordService> = Arc::new(EggProductionService::new(store));
    let auth_state = middleware::AuthState {
        jwt,
        policy: Arc::new(AccessPolicy::egg_production()),
    };

    Router::new()
        .merge(routes::router())
        .route("/v3/api-docs", get(docs::openapi_json))
        .layer(Extension(service))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn_with_state(
                    cors::CorsState::from(cors_policy),
                    cors::cors_middleware,
                )),
        )
}
