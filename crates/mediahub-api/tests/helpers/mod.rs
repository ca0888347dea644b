//! Test helpers: build AppState and router over a temporary uploads root.
//!
//! Run from workspace root: `cargo test -p mediahub-api`.

pub mod encoders;
pub mod fixtures;

use axum_test::TestServer;
use mediahub_api::setup::routes;
use mediahub_api::state::AppState;
use mediahub_core::{BaseConfig, Config, ServiceConfig};
use mediahub_processing::VideoEncoder;
use mediahub_storage::LocalStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_BASE_URL: &str = "http://media.test";

/// Test application: server plus the uploads root it serves from.
pub struct TestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn uploads_dir(&self) -> &Path {
        self._temp_dir.path()
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.uploads_dir().join(key)
    }

    /// Drop a file straight into the uploads root, bypassing the API.
    pub fn seed(&self, key: &str, data: &[u8]) {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, data).unwrap();
    }
}

pub fn test_config(uploads_dir: &Path) -> Config {
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            environment: "test".to_string(),
            http_concurrency_limit: 64,
            api_keys: vec![TEST_API_KEY.to_string()],
        },
        uploads_dir: uploads_dir.to_path_buf(),
        base_url: Some(TEST_BASE_URL.to_string()),
        ffmpeg_path: None,
        transcode_timeout_secs: Some(5),
        max_upload_size_bytes: 10 * 1024 * 1024,
        default_image_quality: 80,
    }))
}

/// Setup test app without an encoder: every video upload takes the copy fallback.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_encoder(None).await
}

pub async fn setup_test_app_with_encoder(encoder: Option<Arc<dyn VideoEncoder>>) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());

    let storage = LocalStorage::new(temp_dir.path())
        .await
        .expect("Failed to create local storage");
    let state = Arc::new(AppState::new(config.clone(), storage, encoder));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");

    TestApp {
        server: TestServer::new(router).expect("Failed to create test server"),
        _temp_dir: temp_dir,
    }
}

pub fn bearer() -> String {
    format!("Bearer {}", TEST_API_KEY)
}
