//! MongoDB-backed resource store.

use bson::oid::ObjectId;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use crate::config::DatabaseConfig;
use crate::resource::{CounterKind, NewResource, Resource, ResourceFilter, ResourceStore};
use crate::{Result, ShareError};

use async_trait::async_trait;

/// Resource record as stored in the collection.
#[derive(Debug, Serialize, Deserialize)]
struct ResourceDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    subject: String,
    college: String,
    category: String,
    course: String,
    semester: String,
    link: String,
    uploader_id: String,
    uploader_name: String,
    uploader_email: String,
    created_at: bson::DateTime,
    download_count: i64,
    read_count: i64,
}

impl ResourceDocument {
    /// Build a fresh document: counters at zero, `created_at` stamped now.
    fn new(resource: NewResource) -> Self {
        Self {
            id: None,
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
            created_at: bson::DateTime::now(),
            download_count: 0,
            read_count: 0,
        }
    }
}

impl From<ResourceDocument> for Resource {
    fn from(doc: ResourceDocument) -> Self {
        Resource {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: doc.title,
            subject: doc.subject,
            college: doc.college,
            category: doc.category,
            course: doc.course,
            semester: doc.semester,
            link: doc.link,
            uploader_id: doc.uploader_id,
            uploader_name: doc.uploader_name,
            uploader_email: doc.uploader_email,
            created_at: doc.created_at.to_chrono(),
            download_count: doc.download_count,
            read_count: doc.read_count,
        }
    }
}

/// [`ResourceStore`] over a MongoDB collection.
pub struct MongoResourceStore {
    collection: Collection<ResourceDocument>,
}

impl MongoResourceStore {
    /// Connect to the configured database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| ShareError::Persistence(format!("failed to connect: {e}")))?;

        let collection = client
            .database(&config.database)
            .collection::<ResourceDocument>(&config.collection);

        Ok(Self { collection })
    }
}

#[async_trait]
impl ResourceStore for MongoResourceStore {
    async fn create(&self, resource: NewResource) -> Result<String> {
        let document = ResourceDocument::new(resource);

        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|e| ShareError::Persistence(format!("insert failed: {e}")))?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ShareError::Persistence("store assigned a non-object id".to_string()))?;

        Ok(id.to_hex())
    }

    async fn increment(&self, id: &str, counter: CounterKind) -> Result<()> {
        let oid = ObjectId::parse_str(id)
            .map_err(|_| ShareError::NotFound("resource".to_string()))?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": oid },
                doc! { "$inc": { counter.field(): 1_i64 } },
            )
            .await
            .map_err(|e| ShareError::Persistence(format!("increment failed: {e}")))?;

        if result.matched_count == 0 {
            return Err(ShareError::NotFound("resource".to_string()));
        }

        Ok(())
    }

    async fn query(&self, filter: &ResourceFilter) -> Result<Vec<Resource>> {
        let cursor = self
            .collection
            .find(filter_document(filter))
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| ShareError::Persistence(format!("query failed: {e}")))?;

        let documents: Vec<ResourceDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| ShareError::Persistence(format!("query failed: {e}")))?;

        Ok(documents.into_iter().map(Resource::from).collect())
    }
}

/// Build the exact-match AND filter document.
fn filter_document(filter: &ResourceFilter) -> Document {
    let mut document = Document::new();

    if let Some(college) = &filter.college {
        document.insert("college", college);
    }
    if let Some(category) = &filter.category {
        document.insert("category", category);
    }
    if let Some(course) = &filter.course {
        document.insert("course", course);
    }
    if let Some(semester) = &filter.semester {
        document.insert("semester", semester);
    }
    if let Some(subject) = &filter.subject {
        document.insert("subject", subject);
    }

    document
}
