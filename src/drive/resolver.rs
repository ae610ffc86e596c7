//! Folder path resolution.

use std::sync::Arc;

use crate::drive::{FolderId, ObjectStore};
use crate::Result;

/// The ordered folder path a resource lives under:
/// College / Course / Sem_N / Subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPath {
    segments: Vec<String>,
}

impl FolderPath {
    /// Build the four-level path for a resource. The subject level uses the
    /// resource title.
    pub fn for_resource(college: &str, course: &str, semester: &str, subject: &str) -> Self {
        Self {
            segments: vec![
                college.to_string(),
                course.to_string(),
                format!("Sem_{semester}"),
                subject.to_string(),
            ],
        }
    }

    /// Path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// Resolves a [`FolderPath`] to the deepest folder's id, creating missing
/// levels on the way down.
///
/// Resolution is strictly sequential: each segment's parent is the previous
/// segment's result. The store enforces no uniqueness on (name, parent), so
/// two concurrent resolves of a brand-new segment can both miss the lookup
/// and create duplicate sibling folders. Both requests still succeed, each
/// with the folder id it actually created; the duplicate sibling is the
/// accepted bound on this race.
pub struct FolderResolver {
    store: Arc<dyn ObjectStore>,
    root: FolderId,
}

impl FolderResolver {
    /// Create a resolver rooted at the given folder.
    pub fn new(store: Arc<dyn ObjectStore>, root: FolderId) -> Self {
        Self { store, root }
    }

    /// Resolve the path, returning the deepest folder's id.
    ///
    /// Any store failure aborts resolution; a partial chain is never treated
    /// as success.
    pub async fn resolve(&self, path: &FolderPath) -> Result<FolderId> {
        let mut parent = self.root.clone();

        for name in path.segments() {
            parent = match self.store.find_folder(name, &parent).await? {
                Some(existing) => existing,
                None => self.store.create_folder(name, &parent).await?,
            };
        }

        Ok(parent)
    }
}
