//! REST client for the external drive API.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::config::DriveConfig;
use crate::drive::{FolderId, ObjectStore, StoredObject, FOLDER_MIME};
use crate::{Result, ShareError};

/// Connect timeout for drive calls, in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total timeout for drive calls, in seconds. Uploads carry file content, so
/// this is more generous than the metadata calls need.
const TOTAL_TIMEOUT_SECS: u64 = 120;

/// Drive-backed [`ObjectStore`].
///
/// Folder lookups, folder creation, media upload and permission grants each
/// map to one REST call authenticated with the configured bearer credential.
pub struct DriveStore {
    http: Client,
    api_base: String,
    upload_base: String,
    token: String,
}

/// File list returned by a folder query.
#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileResource>,
}

/// A file or folder resource as the drive API reports it.
#[derive(Debug, Deserialize)]
struct FileResource {
    id: String,
    #[serde(default, rename = "webViewLink")]
    web_view_link: Option<String>,
}

impl DriveStore {
    /// Create a client from the drive configuration.
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let api_base = normalize_base(&config.api_base)?;
        let upload_base = normalize_base(&config.upload_base)?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .build()
            .map_err(|e| ShareError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base,
            upload_base,
            token: config.api_token.clone(),
        })
    }

    /// Read the response body as failure detail: status line plus whatever
    /// the store sent back.
    async fn failure_detail(response: Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(body) if !body.is_empty() => format!("{status}: {body}"),
            _ => status.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for DriveStore {
    async fn find_folder(&self, name: &str, parent: &FolderId) -> Result<Option<FolderId>> {
        let query = format!(
            "'{}' in parents and name = '{}' and mimeType = '{}' and trashed = false",
            parent.as_str(),
            escape_query_value(name),
            FOLDER_MIME,
        );

        let response = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str()), ("fields", "files(id, name)")])
            .send()
            .await
            .map_err(|e| ShareError::FolderResolution(format!("folder lookup failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ShareError::FolderResolution(format!(
                "folder lookup failed: {}",
                Self::failure_detail(response).await
            )));
        }

        let list: FileList = response
            .json()
            .await
            .map_err(|e| ShareError::FolderResolution(format!("invalid lookup response: {e}")))?;

        Ok(list.files.into_iter().next().map(|f| FolderId::new(f.id)))
    }

    async fn create_folder(&self, name: &str, parent: &FolderId) -> Result<FolderId> {
        let body = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent.as_str()],
        });

        let response = self
            .http
            .post(format!("{}/files", self.api_base))
            .bearer_auth(&self.token)
            .query(&[("fields", "id")])
            .json(&body)
            .send()
            .await
            .map_err(|e| ShareError::FolderResolution(format!("folder create failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ShareError::FolderResolution(format!(
                "folder create failed: {}",
                Self::failure_detail(response).await
            )));
        }

        let folder: FileResource = response
            .json()
            .await
            .map_err(|e| ShareError::FolderResolution(format!("invalid create response: {e}")))?;

        Ok(FolderId::new(folder.id))
    }

    async fn upload_file(
        &self,
        folder: &FolderId,
        name: &str,
        mime_type: &str,
        content: Bytes,
    ) -> Result<StoredObject> {
        let metadata = serde_json::json!({
            "name": name,
            "parents": [folder.as_str()],
        });

        let boundary = format!("studyshare-{}", Uuid::new_v4());
        let body = related_body(&boundary, &metadata.to_string(), mime_type, &content);

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart"), ("fields", "id, webViewLink")])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| ShareError::Upload(format!("object create failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ShareError::Upload(format!(
                "object create failed: {}",
                Self::failure_detail(response).await
            )));
        }

        let file: FileResource = response
            .json()
            .await
            .map_err(|e| ShareError::Upload(format!("invalid upload response: {e}")))?;

        let view_link = file
            .web_view_link
            .ok_or_else(|| ShareError::Upload("store returned no view link".to_string()))?;

        Ok(StoredObject {
            id: file.id,
            view_link,
        })
    }

    async fn share_public(&self, object_id: &str) -> Result<()> {
        let body = serde_json::json!({
            "role": "reader",
            "type": "anyone",
        });

        let response = self
            .http
            .post(format!("{}/files/{}/permissions", self.api_base, object_id))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ShareError::Permission(format!("permission grant failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ShareError::Permission(format!(
                "permission grant failed: {}",
                Self::failure_detail(response).await
            )));
        }

        Ok(())
    }
}

/// Validate a base URL from config and strip any trailing slash.
fn normalize_base(base: &str) -> Result<String> {
    Url::parse(base).map_err(|e| ShareError::Config(format!("invalid drive URL '{base}': {e}")))?;
    Ok(base.trim_end_matches('/').to_string())
}

/// Escape a value for embedding in a drive query string literal.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Build a multipart/related request body: a JSON metadata part followed by
/// the media part.
fn related_body(boundary: &str, metadata: &str, mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + metadata.len() + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    body
}
