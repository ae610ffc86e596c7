//! studyshare - study resource sharing backend
//!
//! The resource ingestion pipeline: authenticated multipart intake, folder
//! resolution in an external drive-style object store, public sharing, a
//! MongoDB record per upload, and de-duplicated read/download counters.

pub mod auth;
pub mod config;
pub mod drive;
pub mod engagement;
pub mod error;
pub mod intake;
pub mod logging;
pub mod resource;
pub mod web;

pub use auth::{JwksVerifier, Principal, TokenVerifier};
pub use config::Config;
pub use drive::{
    DriveStore, FolderId, FolderPath, FolderResolver, MemoryObjectStore, ObjectStore,
    ObjectUploader, StoredObject,
};
pub use engagement::{EngagementLedger, EngagementTracker};
pub use error::{Result, ShareError};
pub use intake::{UploadRequest, UploadedFile};
pub use resource::{
    CounterKind, MemoryResourceStore, MongoResourceStore, NewResource, Resource, ResourceFilter,
    ResourceStore,
};
pub use web::WebServer;
