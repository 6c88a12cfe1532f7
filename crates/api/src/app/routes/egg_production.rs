use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};

use eggs_core::RecordId;
use eggs_production::EggProductionRecord;

use crate::app::{RecordService, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/egg-production", get(list_all).post(create))
        .route("/egg-production/active", get(list_active))
        .route("/egg-production/:id", get(get_by_id).put(update).delete(delete))
        .route("/egg-production/activate/:id", put(activate))
        .route("/egg-production/inactivate/:id", put(inactivate))
}

fn parse_id(raw: &str) -> Result<RecordId, Response> {
    raw.parse::<RecordId>().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "record id must be an integer")
    })
}

/// Body rejections (bad JSON, wrong content type) keep the JSON error shape.
fn parse_body(
    body: Result<Json<EggProductionRecord>, JsonRejection>,
) -> Result<EggProductionRecord, Response> {
    body.map(|Json(record)| record).map_err(|rejection| {
        errors::json_error(rejection.status(), "invalid_body", rejection.body_text())
    })
}

fn subject(principal: &Option<Extension<PrincipalContext>>) -> &str {
    principal
        .as_ref()
        .and_then(|Extension(p)| p.subject())
        .unwrap_or("anonymous")
}

/// Empty 200: the outcome for a missing record, and for delete.
fn empty_ok() -> Response {
    StatusCode::OK.into_response()
}

#[utoipa::path(
    get,
    path = "/egg-production",
    tag = "egg-production",
    responses((status = 200, description = "All records, ascending id", body = [EggProductionRecord])),
    security(("bearer" = []))
)]
pub async fn list_all(Extension(service): Extension<Arc<RecordService>>) -> Response {
    match service.list_all().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/egg-production/active",
    tag = "egg-production",
    responses((status = 200, description = "Active records, ascending id", body = [EggProductionRecord])),
    security(("bearer" = []))
)]
pub async fn list_active(Extension(service): Extension<Arc<RecordService>>) -> Response {
    match service.list_active().await {
        Ok(records) => Json(records).into_response(),
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/egg-production/{id}",
    tag = "egg-production",
    params(("id" = i32, Path, description = "Record id")),
    responses(
        (status = 200, description = "The record, or an empty body if it does not exist", body = EggProductionRecord),
        (status = 400, description = "Non-integer id"),
    ),
    security(("bearer" = []))
)]
pub async fn get_by_id(
    Extension(service): Extension<Arc<RecordService>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.get_by_id(id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => empty_ok(),
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/egg-production",
    tag = "egg-production",
    request_body = EggProductionRecord,
    responses(
        (status = 200, description = "The stored record with its assigned id", body = EggProductionRecord),
        (status = 400, description = "Malformed JSON body"),
    ),
    security(("bearer" = []))
)]
pub async fn create(
    Extension(service): Extension<Arc<RecordService>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<EggProductionRecord>, JsonRejection>,
) -> Response {
    let body = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };

    match service.create(body).await {
        Ok(record) => {
            tracing::info!(id = ?record.id, by = subject(&principal), "record created");
            Json(record).into_response()
        }
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/egg-production/{id}",
    tag = "egg-production",
    params(("id" = i32, Path, description = "Record id")),
    request_body = EggProductionRecord,
    responses(
        (status = 200, description = "The overwritten record, or an empty body if it does not exist", body = EggProductionRecord),
        (status = 400, description = "Non-integer id or malformed JSON body"),
    ),
    security(("bearer" = []))
)]
pub async fn update(
    Extension(service): Extension<Arc<RecordService>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<EggProductionRecord>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let body = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };

    match service.update(id, body).await {
        Ok(Some(record)) => {
            tracing::info!(%id, by = subject(&principal), "record updated");
            Json(record).into_response()
        }
        Ok(None) => empty_ok(),
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/egg-production/{id}",
    tag = "egg-production",
    params(("id" = i32, Path, description = "Record id")),
    responses(
        (status = 200, description = "Deleted, or nothing to delete"),
        (status = 400, description = "Non-integer id"),
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    Extension(service): Extension<Arc<RecordService>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.delete(id).await {
        Ok(()) => {
            tracing::info!(%id, by = subject(&principal), "record deleted");
            empty_ok()
        }
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/egg-production/activate/{id}",
    tag = "egg-production",
    params(("id" = i32, Path, description = "Record id")),
    responses(
        (status = 204, description = "Record is active (no-op if missing)"),
        (status = 400, description = "Non-integer id"),
    ),
    security(("bearer" = []))
)]
pub async fn activate(
    Extension(service): Extension<Arc<RecordService>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.activate(id).await {
        Ok(()) => {
            tracing::info!(%id, by = subject(&principal), "record activated");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/egg-production/inactivate/{id}",
    tag = "egg-production",
    params(("id" = i32, Path, description = "Record id")),
    responses(
        (status = 204, description = "Record is inactive (no-op if missing)"),
        (status = 400, description = "Non-integer id"),
    ),
    security(("bearer" = []))
)]
pub async fn inactivate(
    Extension(service): Extension<Arc<RecordService>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.inactivate(id).await {
        Ok(()) => {
            tracing::info!(%id, by = subject(&principal), "record inactivated");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::ApiError::from(e).into_response(),
    }
}
