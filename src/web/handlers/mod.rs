//! API handlers for the Web API.

pub mod resources;
pub mod upload;

pub use resources::*;
pub use upload::*;

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::drive::{FolderId, ObjectStore};
use crate::resource::ResourceStore;

/// Default maximum upload size (25MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 25 * 1024 * 1024;

/// Shared application state: the injected external-service handles plus the
/// upload limits. Built once at startup and reused by every request.
pub struct AppState {
    /// Bearer token verifier.
    pub verifier: Arc<dyn TokenVerifier>,
    /// External object store.
    pub objects: Arc<dyn ObjectStore>,
    /// Resource record store.
    pub resources: Arc<dyn ResourceStore>,
    /// Folder the resource tree hangs under.
    pub drive_root: FolderId,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create application state over the given service handles.
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        objects: Arc<dyn ObjectStore>,
        resources: Arc<dyn ResourceStore>,
    ) -> Self {
        Self {
            verifier,
            objects,
            resources,
            drive_root: FolderId::root(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set the root folder of the resource tree.
    pub fn with_drive_root(mut self, root: FolderId) -> Self {
        self.drive_root = root;
        self
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }
}
