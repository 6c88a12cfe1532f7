use axum::Router;

pub mod egg_production;

/// Router for all record endpoints. Paths are spelled out in full so they line
/// up with the access policy's path patterns.
pub fn router() -> Router {
    egg_production::router()
}
