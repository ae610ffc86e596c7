//! Multipart intake for upload requests.
//!
//! Parses the raw multipart body into a validated, strongly-typed
//! [`UploadRequest`] before any external call is made. Text fields are
//! coerced to single string values (first occurrence wins) and exactly one
//! `file` part is accepted.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use validator::Validate;

use crate::{Result, ShareError};

/// Maximum length for classification fields and the title (in characters).
pub const MAX_FIELD_LENGTH: usize = 200;

/// The uploaded file payload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename supplied by the client.
    pub name: String,
    /// MIME type of the payload.
    pub mime_type: String,
    /// File content.
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A fully parsed and validated upload request.
#[derive(Debug, Validate)]
pub struct UploadRequest {
    /// Resource title; also used as the subject folder name.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// College the resource belongs to.
    #[validate(length(min = 1, max = 200))]
    pub college: String,
    /// Subject category.
    #[validate(length(min = 1, max = 200))]
    pub category: String,
    /// Course name.
    #[validate(length(min = 1, max = 200))]
    pub course: String,
    /// Semester number, kept as the client-supplied string.
    #[validate(length(min = 1, max = 200))]
    pub semester: String,
    /// The file payload.
    pub file: UploadedFile,
}

/// Read and validate an upload request from a multipart body.
///
/// Fails with `MalformedRequest` when the body is not parseable, a required
/// field is missing or empty, the file part is absent, or more than one file
/// part is present.
pub async fn read_upload_request(mut multipart: Multipart) -> Result<UploadRequest> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ShareError::MalformedRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            if file.is_some() {
                return Err(ShareError::MalformedRequest(
                    "more than one file part".to_string(),
                ));
            }

            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ShareError::MalformedRequest("file part has no filename".to_string())
                })?;

            let mime_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| guess_mime(&file_name));

            let bytes = field.bytes().await.map_err(|e| {
                ShareError::MalformedRequest(format!("failed to read file content: {e}"))
            })?;

            file = Some(UploadedFile {
                name: file_name,
                mime_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(|e| {
                ShareError::MalformedRequest(format!("failed to read field '{name}': {e}"))
            })?;
            // First occurrence wins for repeated fields.
            fields.entry(name).or_insert(value);
        }
    }

    build_request(fields, file)
}

/// Assemble the typed request from collected parts.
fn build_request(
    mut fields: HashMap<String, String>,
    file: Option<UploadedFile>,
) -> Result<UploadRequest> {
    let file =
        file.ok_or_else(|| ShareError::MalformedRequest("missing file part".to_string()))?;

    let request = UploadRequest {
        title: take_field(&mut fields, "title")?,
        college: take_field(&mut fields, "college")?,
        category: take_field(&mut fields, "category")?,
        course: take_field(&mut fields, "course")?,
        semester: take_field(&mut fields, "semester")?,
        file,
    };

    request
        .validate()
        .map_err(|e| ShareError::MalformedRequest(e.to_string()))?;

    Ok(request)
}

/// Extract a required text field, trimmed.
fn take_field(fields: &mut HashMap<String, String>, name: &str) -> Result<String> {
    let value = fields
        .remove(name)
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    if value.is_empty() {
        return Err(ShareError::MalformedRequest(format!(
            "missing field '{name}'"
        )));
    }

    Ok(value)
}

/// Guess a MIME type from the filename, defaulting to octet-stream.
fn guess_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .to_string()
}
