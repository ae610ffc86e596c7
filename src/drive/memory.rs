//! In-memory object store for tests and local development.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::drive::{FolderId, ObjectStore, StoredObject};
use crate::{Result, ShareError};

#[derive(Debug, Clone)]
struct FolderRecord {
    id: String,
    name: String,
    parent: String,
    trashed: bool,
}

#[derive(Debug, Clone)]
struct ObjectRecord {
    id: String,
    folder: String,
    name: String,
    mime_type: String,
    size: usize,
    public: bool,
}

#[derive(Debug, Default)]
struct Inner {
    folders: Vec<FolderRecord>,
    objects: Vec<ObjectRecord>,
}

/// In-memory [`ObjectStore`].
///
/// Keeps the folder tree and objects in process memory, counts every store
/// call, and can be told to fail the sharing step, so tests can assert on
/// side effects and partial-failure behavior.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
    folder_lookups: AtomicUsize,
    folder_creates: AtomicUsize,
    uploads: AtomicUsize,
    fail_share: AtomicBool,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent [`ObjectStore::share_public`] calls fail.
    pub fn set_fail_share(&self, fail: bool) {
        self.fail_share.store(fail, Ordering::SeqCst);
    }

    /// Number of folder lookup calls made so far.
    pub fn folder_lookups(&self) -> usize {
        self.folder_lookups.load(Ordering::SeqCst)
    }

    /// Number of folder create calls made so far.
    pub fn folder_creates(&self) -> usize {
        self.folder_creates.load(Ordering::SeqCst)
    }

    /// Number of upload calls made so far.
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Total number of folders in the store.
    pub fn folder_count(&self) -> usize {
        self.inner.lock().unwrap().folders.len()
    }

    /// Total number of objects in the store.
    pub fn object_count(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }

    /// Number of non-trashed folders with this name under this parent.
    pub fn folders_named(&self, name: &str, parent: &FolderId) -> usize {
        self.inner
            .lock()
            .unwrap()
            .folders
            .iter()
            .filter(|f| f.name == name && f.parent == parent.as_str() && !f.trashed)
            .count()
    }

    /// Name, MIME type and size of a stored object.
    pub fn object_metadata(&self, object_id: &str) -> Option<(String, String, usize)> {
        self.inner
            .lock()
            .unwrap()
            .objects
            .iter()
            .find(|o| o.id == object_id)
            .map(|o| (o.name.clone(), o.mime_type.clone(), o.size))
    }

    /// Ids of objects stored under a folder.
    pub fn objects_in_folder(&self, folder: &FolderId) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .objects
            .iter()
            .filter(|o| o.folder == folder.as_str())
            .map(|o| o.id.clone())
            .collect()
    }

    /// Whether the object exists and is publicly readable.
    pub fn object_is_public(&self, object_id: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .objects
            .iter()
            .any(|o| o.id == object_id && o.public)
    }

    /// Mark a folder as trashed.
    pub fn trash_folder(&self, folder: &FolderId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.folders.iter_mut().find(|f| f.id == folder.as_str()) {
            record.trashed = true;
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn find_folder(&self, name: &str, parent: &FolderId) -> Result<Option<FolderId>> {
        self.folder_lookups.fetch_add(1, Ordering::SeqCst);

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .folders
            .iter()
            .find(|f| f.name == name && f.parent == parent.as_str() && !f.trashed)
            .map(|f| FolderId::new(f.id.clone())))
    }

    async fn create_folder(&self, name: &str, parent: &FolderId) -> Result<FolderId> {
        self.folder_creates.fetch_add(1, Ordering::SeqCst);

        let id = format!("folder-{}", Uuid::new_v4());
        let mut inner = self.inner.lock().unwrap();
        inner.folders.push(FolderRecord {
            id: id.clone(),
            name: name.to_string(),
            parent: parent.as_str().to_string(),
            trashed: false,
        });

        Ok(FolderId::new(id))
    }

    async fn upload_file(
        &self,
        folder: &FolderId,
        name: &str,
        mime_type: &str,
        content: Bytes,
    ) -> Result<StoredObject> {
        self.uploads.fetch_add(1, Ordering::SeqCst);

        let id = format!("object-{}", Uuid::new_v4());
        let mut inner = self.inner.lock().unwrap();
        inner.objects.push(ObjectRecord {
            id: id.clone(),
            folder: folder.as_str().to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: content.len(),
            public: false,
        });

        Ok(StoredObject {
            view_link: format!("https://drive.example.com/file/d/{id}/view"),
            id,
        })
    }

    async fn share_public(&self, object_id: &str) -> Result<()> {
        if self.fail_share.load(Ordering::SeqCst) {
            return Err(ShareError::Permission(
                "share rejected by store".to_string(),
            ));
        }

        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .objects
            .iter_mut()
            .find(|o| o.id == object_id)
            .ok_or_else(|| ShareError::Permission(format!("no such object: {object_id}")))?;
        record.public = true;

        Ok(())
    }
}
