//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{count_download, count_read, list_resources, upload_resource, AppState};
use super::middleware::{attach_verifier, create_cors_layer};

/// Slack on top of the configured upload size for multipart framing and the
/// text fields.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the main API router.
pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let routes = Router::new()
        .route("/upload", post(upload_resource))
        .route("/resources", get(list_resources))
        .route("/resources/:id/read", post(count_read))
        .route("/resources/:id/download", post(count_download));

    let verifier = state.verifier.clone();
    let body_limit = state.max_upload_size as usize + MULTIPART_OVERHEAD;

    routes
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let verifier = verifier.clone();
                    attach_verifier(verifier, req, next)
                })),
        )
        .with_state(state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// OpenAPI document for the Web API.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::handlers::upload::upload_resource,
        crate::web::handlers::resources::list_resources,
        crate::web::handlers::resources::count_read,
        crate::web::handlers::resources::count_download,
    ),
    components(schemas(
        crate::web::dto::UploadResponse,
        crate::web::dto::ResourceListResponse,
        crate::web::dto::AckResponse,
        crate::resource::Resource,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "resources", description = "Resource ingestion and lookup"),
        (name = "engagement", description = "Engagement counter actions")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
    }

    #[test]
    fn test_openapi_document_lists_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/upload"));
        assert!(doc.paths.paths.contains_key("/resources"));
        assert!(doc.paths.paths.contains_key("/resources/{id}/read"));
        assert!(doc.paths.paths.contains_key("/resources/{id}/download"));
    }
}
