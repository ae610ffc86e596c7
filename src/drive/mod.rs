//! External object store integration.
//!
//! Uploaded files live in an external drive-style store as leaves of a
//! four-level folder tree (College / Course / Sem_N / Subject). This module
//! provides the [`ObjectStore`] seam plus the two pipeline stages built on
//! top of it: [`FolderResolver`] and [`ObjectUploader`].

mod client;
mod memory;
mod resolver;
mod uploader;

pub use client::DriveStore;
pub use memory::MemoryObjectStore;
pub use resolver::{FolderPath, FolderResolver};
pub use uploader::ObjectUploader;

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;

/// MIME type the store uses to mark folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Opaque identifier of a folder in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderId(String);

impl FolderId {
    /// Wrap a store-assigned folder id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The store's implicit top-level folder.
    pub fn root() -> Self {
        Self("root".to_string())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored object: its id plus the public view link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Store-assigned object id.
    pub id: String,
    /// Public view link for the object.
    pub view_link: String,
}

/// Operations the pipeline needs from the external object store.
///
/// Every call maps to one remote operation; implementations report failures
/// with the error kind of the pipeline stage they serve (folder calls with
/// `FolderResolution`, uploads with `Upload`, sharing with `Permission`).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Point lookup for a non-trashed folder with this exact name and parent.
    async fn find_folder(&self, name: &str, parent: &FolderId) -> Result<Option<FolderId>>;

    /// Create a folder under the given parent.
    async fn create_folder(&self, name: &str, parent: &FolderId) -> Result<FolderId>;

    /// Create an object under the given folder with the payload as content.
    async fn upload_file(
        &self,
        folder: &FolderId,
        name: &str,
        mime_type: &str,
        content: Bytes,
    ) -> Result<StoredObject>;

    /// Grant read access to anyone with the link.
    async fn share_public(&self, object_id: &str) -> Result<()>;
}
