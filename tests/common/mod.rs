//! Shared helpers for Web API integration tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;

use studyshare::web::handlers::AppState;
use studyshare::web::router::{create_health_router, create_router};
use studyshare::{
    MemoryObjectStore, MemoryResourceStore, NewResource, Principal, ResourceStore, Result,
    ShareError, TokenVerifier,
};

/// Bearer token the test verifier accepts.
pub const VALID_TOKEN: &str = "valid-token";

/// Token verifier accepting a fixed set of tokens.
#[derive(Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: &str, principal: Principal) -> Self {
        self.tokens.insert(token.to_string(), principal);
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Principal> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| ShareError::Unauthorized("unknown token".to_string()))
    }
}

/// The principal behind [`VALID_TOKEN`].
pub fn test_principal() -> Principal {
    Principal {
        id: "uid-1".to_string(),
        email: "asha@example.com".to_string(),
        display_name: Some("Asha".to_string()),
    }
}

/// A test server plus handles on the in-memory stores behind it.
pub struct TestApp {
    pub server: TestServer,
    pub objects: Arc<MemoryObjectStore>,
    pub resources: Arc<MemoryResourceStore>,
}

/// Build a test server over in-memory stores and the static verifier.
pub fn create_test_app() -> TestApp {
    create_test_app_with_limit(25 * 1024 * 1024)
}

/// Same as [`create_test_app`], with a custom upload size limit.
pub fn create_test_app_with_limit(max_upload_size: u64) -> TestApp {
    let objects = Arc::new(MemoryObjectStore::new());
    let resources = Arc::new(MemoryResourceStore::new());
    let verifier = Arc::new(StaticVerifier::new().with_token(VALID_TOKEN, test_principal()));

    let state = Arc::new(
        AppState::new(verifier, objects.clone(), resources.clone())
            .with_max_upload_size(max_upload_size),
    );

    let router = create_router(state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        objects,
        resources,
    }
}

/// Seed one resource record directly into the store.
pub async fn seed_resource(
    resources: &MemoryResourceStore,
    title: &str,
    college: &str,
    semester: &str,
) -> String {
    resources
        .create(NewResource {
            title: title.to_string(),
            college: college.to_string(),
            category: "Engineering & Technology".to_string(),
            course: "B.Tech Computer Science".to_string(),
            semester: semester.to_string(),
            link: format!("https://drive.example.com/file/d/{title}/view"),
            uploader_id: "uid-1".to_string(),
            uploader_name: "Asha".to_string(),
            uploader_email: "asha@example.com".to_string(),
        })
        .await
        .expect("Failed to seed resource")
}
