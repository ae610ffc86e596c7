//! In-memory resource store for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;

use crate::resource::{CounterKind, NewResource, Resource, ResourceFilter, ResourceStore};
use crate::{Result, ShareError};

/// [`ResourceStore`] keeping records in process memory.
///
/// Records are held in insertion order, which is also `created_at` order, so
/// queries return the reversed list.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    resources: Mutex<Vec<Resource>>,
}

impl MemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch one record by id.
    pub fn get(&self, id: &str) -> Option<Resource> {
        self.resources
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

fn matches(resource: &Resource, filter: &ResourceFilter) -> bool {
    fn field_matches(value: &str, wanted: &Option<String>) -> bool {
        wanted.as_deref().map_or(true, |w| w == value)
    }

    field_matches(&resource.college, &filter.college)
        && field_matches(&resource.category, &filter.category)
        && field_matches(&resource.course, &filter.course)
        && field_matches(&resource.semester, &filter.semester)
        && field_matches(&resource.subject, &filter.subject)
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn create(&self, resource: NewResource) -> Result<String> {
        let id = ObjectId::new().to_hex();

        let record = Resource {
            id: id.clone(),
            subject: resource.title.clone(),
            title: resource.title,
            college: resource.college,
            category: resource.category,
            course: resource.course,
            semester: resource.semester,
            link: resource.link,
            uploader_id: resource.uploader_id,
            uploader_name: resource.uploader_name,
            uploader_email: resource.uploader_email,
            created_at: Utc::now(),
            download_count: 0,
            read_count: 0,
        };

        self.resources.lock().unwrap().push(record);
        Ok(id)
    }

    async fn increment(&self, id: &str, counter: CounterKind) -> Result<()> {
        let mut resources = self.resources.lock().unwrap();
        let record = resources
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ShareError::NotFound("resource".to_string()))?;

        match counter {
            CounterKind::Read => record.read_count += 1,
            CounterKind::Download => record.download_count += 1,
        }

        Ok(())
    }

    async fn query(&self, filter: &ResourceFilter) -> Result<Vec<Resource>> {
        let resources = self.resources.lock().unwrap();
        Ok(resources
            .iter()
            .rev()
            .filter(|r| matches(r, filter))
            .cloned()
            .collect())
    }
}
