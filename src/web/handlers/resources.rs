//! Resource query and engagement counter handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::resource::CounterKind;
use crate::web::dto::{AckResponse, ResourceListResponse, ResourceQuery};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthPrincipal;
use crate::ShareError;

/// GET /resources - List resources matching the classification filters.
#[utoipa::path(
    get,
    path = "/resources",
    tag = "resources",
    params(ResourceQuery),
    responses(
        (status = 200, description = "Matching resources, newest first", body = ResourceListResponse),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<ResourceListResponse>, ApiError> {
    let filter = query.into_filter();

    let data = state.resources.query(&filter).await.map_err(|e| {
        tracing::error!(error = %e, "resource query failed");
        ApiError::internal("Failed to fetch resources")
    })?;

    Ok(Json(ResourceListResponse::new(data)))
}

/// POST /resources/:id/read - Count a preview action.
///
/// De-duplication lives in the client's ledger; this endpoint is the bare
/// atomic increment.
#[utoipa::path(
    post,
    path = "/resources/{id}/read",
    tag = "engagement",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Counter updated", body = AckResponse),
        (status = 404, description = "Resource not found"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn count_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AckResponse>, ApiError> {
    increment(&state, &id, CounterKind::Read).await?;
    Ok(Json(AckResponse::ok()))
}

/// POST /resources/:id/download - Count a download action.
///
/// Downloads require a verified principal; the preview action does not.
#[utoipa::path(
    post,
    path = "/resources/{id}/download",
    tag = "engagement",
    params(("id" = String, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Counter updated", body = AckResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Resource not found"),
        (status = 500, description = "Backend failure")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn count_download(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(_principal): AuthPrincipal,
    Path(id): Path<String>,
) -> Result<Json<AckResponse>, ApiError> {
    increment(&state, &id, CounterKind::Download).await?;
    Ok(Json(AckResponse::ok()))
}

async fn increment(state: &AppState, id: &str, counter: CounterKind) -> Result<(), ApiError> {
    state
        .resources
        .increment(id, counter)
        .await
        .map_err(|e| match e {
            ShareError::NotFound(_) => ApiError::not_found("Resource not found"),
            other => {
                tracing::error!(error = %other, counter = %counter, "counter increment failed");
                ApiError::internal("Failed to update counters")
            }
        })
}
