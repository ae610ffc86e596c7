//! Error types for studyshare.

use thiserror::Error;

/// Common error type for studyshare.
///
/// Each variant corresponds to one stage of the ingestion pipeline, so a
/// failed request maps to exactly one terminal error.
#[derive(Error, Debug)]
pub enum ShareError {
    /// Bearer credential missing, malformed, expired or rejected by the
    /// identity service.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The multipart body could not be parsed into an upload request.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A folder lookup or create call against the object store failed.
    #[error("folder resolution failed: {0}")]
    FolderResolution(String),

    /// The object create call failed; no object was stored.
    #[error("upload failed: {0}")]
    Upload(String),

    /// The object was created but could not be made publicly readable.
    /// The orphaned object is left behind in the store.
    #[error("permission grant failed: {0}")]
    Permission(String),

    /// Document store write error.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Target resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for studyshare operations.
pub type Result<T> = std::result::Result<T, ShareError>;
