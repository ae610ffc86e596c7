//! Object upload and public sharing.

use std::sync::Arc;

use crate::drive::{FolderId, ObjectStore, StoredObject};
use crate::intake::UploadedFile;
use crate::Result;

/// Streams a file payload into a resolved folder and makes it publicly
/// readable.
///
/// Both steps must succeed. When the create succeeds but sharing fails, the
/// object is left behind unshared and the error is surfaced to the caller;
/// cleanup of such orphans is a maintenance task, not part of the pipeline.
pub struct ObjectUploader {
    store: Arc<dyn ObjectStore>,
}

impl ObjectUploader {
    /// Create an uploader over the given store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Upload the file under `folder` and grant anyone-with-the-link read
    /// access.
    pub async fn upload(&self, folder: &FolderId, file: &UploadedFile) -> Result<StoredObject> {
        let object = self
            .store
            .upload_file(folder, &file.name, &file.mime_type, file.bytes.clone())
            .await?;

        if let Err(e) = self.store.share_public(&object.id).await {
            tracing::warn!(
                object_id = %object.id,
                error = %e,
                "object created but sharing failed; orphaned object left in store"
            );
            return Err(e);
        }

        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MemoryObjectStore;
    use crate::ShareError;
    use bytes::Bytes;

    fn sample_file() -> UploadedFile {
        UploadedFile {
            name: "notes.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[tokio::test]
    async fn test_upload_shares_object() {
        let store = Arc::new(MemoryObjectStore::new());
        let folder = store.create_folder("Sem_1", &FolderId::root()).await.unwrap();

        let uploader = ObjectUploader::new(store.clone());
        let object = uploader.upload(&folder, &sample_file()).await.unwrap();

        assert!(store.object_is_public(&object.id));
        assert!(object.view_link.contains(&object.id));
    }

    #[tokio::test]
    async fn test_share_failure_is_not_success() {
        let store = Arc::new(MemoryObjectStore::new());
        let folder = store.create_folder("Sem_1", &FolderId::root()).await.unwrap();
        store.set_fail_share(true);

        let uploader = ObjectUploader::new(store.clone());
        let result = uploader.upload(&folder, &sample_file()).await;

        assert!(matches!(result, Err(ShareError::Permission(_))));
        // The orphaned object stays behind, unshared.
        assert_eq!(store.object_count(), 1);
    }
}
