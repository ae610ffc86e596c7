//! Resource records and the document store seam.
//!
//! One immutable-on-write record is persisted per successful upload; after
//! creation only the engagement counters change, and only through atomic
//! server-side increments.

mod memory;
mod mongo;

pub use memory::MemoryResourceStore;
pub use mongo::MongoResourceStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::Result;

/// Which engagement counter an action touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    /// Resource was opened for preview.
    Read,
    /// Resource file link was opened.
    Download,
}

impl CounterKind {
    /// Name of the counter field in the persisted record.
    pub fn field(&self) -> &'static str {
        match self {
            CounterKind::Read => "read_count",
            CounterKind::Download => "download_count",
        }
    }
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CounterKind::Read => f.write_str("read"),
            CounterKind::Download => f.write_str("download"),
        }
    }
}

/// A persisted study resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Resource {
    /// Store-assigned id.
    pub id: String,
    /// Resource title.
    pub title: String,
    /// Subject name; same value as the title.
    pub subject: String,
    /// College classification key.
    pub college: String,
    /// Category classification key.
    pub category: String,
    /// Course classification key.
    pub course: String,
    /// Semester classification key.
    pub semester: String,
    /// Public view link of the stored file.
    pub link: String,
    /// Principal id of the uploader.
    pub uploader_id: String,
    /// Uploader display name, denormalized at write time.
    pub uploader_name: String,
    /// Uploader email, denormalized at write time.
    pub uploader_email: String,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Unique download count.
    pub download_count: i64,
    /// Unique read count.
    pub read_count: i64,
}

/// Fields of a record about to be created. Counters and `created_at` are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewResource {
    /// Resource title and subject name.
    pub title: String,
    /// College classification key.
    pub college: String,
    /// Category classification key.
    pub category: String,
    /// Course classification key.
    pub course: String,
    /// Semester classification key.
    pub semester: String,
    /// Public view link of the stored file.
    pub link: String,
    /// Principal id of the uploader.
    pub uploader_id: String,
    /// Uploader display name.
    pub uploader_name: String,
    /// Uploader email.
    pub uploader_email: String,
}

/// Exact-match filters for resource queries. All provided filters are
/// combined with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    /// Match on college.
    pub college: Option<String>,
    /// Match on category.
    pub category: Option<String>,
    /// Match on course.
    pub course: Option<String>,
    /// Match on semester.
    pub semester: Option<String>,
    /// Match on subject.
    pub subject: Option<String>,
}

impl ResourceFilter {
    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        self.college.is_none()
            && self.category.is_none()
            && self.course.is_none()
            && self.semester.is_none()
            && self.subject.is_none()
    }
}

/// Document store operations for resource records.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Insert one record; counters start at zero, `created_at` is assigned
    /// server-side. Returns the new record's id.
    async fn create(&self, resource: NewResource) -> Result<String>;

    /// Atomically increment one engagement counter. `NotFound` when the
    /// record does not exist.
    async fn increment(&self, id: &str, counter: CounterKind) -> Result<()>;

    /// List records matching the filter, newest first. Empty result is not
    /// an error.
    async fn query(&self, filter: &ResourceFilter) -> Result<Vec<Resource>>;
}
