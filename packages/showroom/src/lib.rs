pub mod assets;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use common::StorageBackend;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::extractors::upload::upload_body_limit;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Showroom API",
        version = "1.0.0",
        description = "Catalog and media API for the dealership website"
    ),
    tags(
        (name = "Auth", description = "Admin login"),
        (name = "Categories", description = "Vehicle categories; deleting one cascades to its promotions"),
        (name = "Promotions", description = "Promotion banners per category"),
        (name = "Products", description = "Vehicles and their photos"),
        (name = "Contacts", description = "Contact channels with QR codes"),
        (name = "Gallery", description = "Showroom photo gallery"),
        (name = "Videos", description = "Embedded YouTube videos"),
        (name = "Slides", description = "Home page intro slides"),
        (name = "Website Images", description = "Logo and footer logo"),
        (name = "Drafts", description = "Staged uploads awaiting commit"),
        (name = "Maintenance", description = "Orphaned blob reconciliation"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            config
                .allow_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let mut app = router
        .layer(upload_body_limit(state.config.storage.max_upload_size))
        .layer(cors_layer(&state.config.server.cors));

    if state.config.storage.backend == StorageBackend::Filesystem {
        app = app.nest_service("/media", ServeDir::new(&state.config.storage.root));
    }

    app.with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
