//! OpenAPI document for the record resource, served at `/v3/api-docs`.

use axum::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use eggs_production::{EggProductionRecord, RecordStatus};

use crate::app::routes::egg_production;

#[derive(OpenApi)]
#[openapi(
    info(title = "Egg production API", version = "0.1.0"),
    paths(
        egg_production::list_all,
        egg_production::list_active,
        egg_production::get_by_id,
        egg_production::create,
        egg_production::update,
        egg_production::delete,
        egg_production::activate,
        egg_production::inactivate,
    ),
    components(schemas(EggProductionRecord, RecordStatus)),
    modifiers(&BearerAuth),
    tags((name = "egg-production", description = "Daily egg production records"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
