//! Upload handler: the resource ingestion pipeline.

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::drive::{FolderPath, FolderResolver, ObjectUploader};
use crate::intake::read_upload_request;
use crate::resource::NewResource;
use crate::web::dto::UploadResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthPrincipal;
use crate::ShareError;

/// POST /upload - Ingest one study resource.
///
/// The pipeline is strictly sequential: the verified principal comes from
/// the extractor, then the multipart body is parsed, the four-level folder
/// path resolved, the file uploaded and shared, and finally the record
/// persisted. Any failed step aborts the request with a single terminal
/// error; partial external state (an orphaned folder or object) is logged,
/// never reported as success.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "resources",
    responses(
        (status = 200, description = "Resource uploaded", body = UploadResponse),
        (status = 400, description = "Malformed multipart body"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Upload failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_resource(
    State(state): State<Arc<AppState>>,
    AuthPrincipal(principal): AuthPrincipal,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let request = read_upload_request(multipart).await?;

    if request.file.size() as u64 > state.max_upload_size {
        let max_mb = state.max_upload_size / 1024 / 1024;
        return Err(ApiError::bad_request(format!(
            "File too large (max {max_mb}MB)"
        )));
    }

    let path = FolderPath::for_resource(
        &request.college,
        &request.course,
        &request.semester,
        &request.title,
    );

    let resolver = FolderResolver::new(state.objects.clone(), state.drive_root.clone());
    let folder = resolver.resolve(&path).await.map_err(pipeline_error)?;

    let uploader = ObjectUploader::new(state.objects.clone());
    let stored = uploader
        .upload(&folder, &request.file)
        .await
        .map_err(pipeline_error)?;

    let record = NewResource {
        title: request.title,
        college: request.college,
        category: request.category,
        course: request.course,
        semester: request.semester,
        link: stored.view_link.clone(),
        uploader_id: principal.id.clone(),
        uploader_name: principal.uploader_name(),
        uploader_email: principal.email.clone(),
    };

    let id = state.resources.create(record).await.map_err(|e| {
        // The object is already uploaded and shared; this leaves an orphaned
        // file with no indexed record.
        tracing::error!(
            object_id = %stored.id,
            error = %e,
            "record insert failed after upload; orphaned object left in store"
        );
        ApiError::internal("Upload failed")
    })?;

    tracing::info!(
        resource_id = %id,
        object_id = %stored.id,
        uploader_id = %principal.id,
        size = request.file.size(),
        "resource uploaded"
    );

    Ok(Json(UploadResponse::new(stored.view_link)))
}

/// Log an external-store failure and map it to the generic upload error.
fn pipeline_error(err: ShareError) -> ApiError {
    tracing::error!(error = %err, "upload pipeline failed");
    ApiError::internal("Upload failed")
}
