use std::sync::Arc;

use tracing::info;

use studyshare::web::handlers::AppState;
use studyshare::{Config, DriveStore, FolderId, JwksVerifier, MongoResourceStore, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = studyshare::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!("studyshare - study resource sharing backend");

    let verifier = match JwksVerifier::new(&config.identity) {
        Ok(verifier) => Arc::new(verifier),
        Err(e) => {
            eprintln!("Failed to create token verifier: {e}");
            std::process::exit(1);
        }
    };

    let objects = match DriveStore::new(&config.drive) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to create drive client: {e}");
            std::process::exit(1);
        }
    };

    let resources = match MongoResourceStore::connect(&config.database).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to connect to the document store: {e}");
            std::process::exit(1);
        }
    };

    let state = Arc::new(
        AppState::new(verifier, objects, resources)
            .with_drive_root(FolderId::new(&config.drive.root_folder))
            .with_max_upload_size(config.max_upload_bytes()),
    );

    let server = match WebServer::new(&config.server, state) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to configure web server: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
