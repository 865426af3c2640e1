use std::sync::Arc;
use tokio::task::JoinHandle;

use loganything::{
    ai::GenerativeBackend,
    auth::TokenConfig,
    build_router,
    logs::{repository::InMemoryLogRepository, upload::UploadStore},
    user::repository::InMemoryUserRepository,
    AppState,
};

use super::mocks::MockGenerativeBackend;

pub const TEST_SECRET: &str = "integration-secret";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A real server on an ephemeral port backed by in-memory repositories
pub struct TestServer {
    pub base_url: String,
    pub http: reqwest::Client,
    pub ai: Arc<MockGenerativeBackend>,
    pub upload_dir: tempfile::TempDir,
    _server_handle: JoinHandle<()>,
}

pub struct TestServerBuilder {
    token_ttl_minutes: i64,
    ai_reply: String,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            token_ttl_minutes: 60,
            ai_reply: "Keep it up!".to_string(),
        }
    }

    #[allow(dead_code)]
    pub fn with_token_ttl(mut self, minutes: i64) -> Self {
        self.token_ttl_minutes = minutes;
        self
    }

    #[allow(dead_code)]
    pub fn with_ai_reply(mut self, reply: &str) -> Self {
        self.ai_reply = reply.to_string();
        self
    }

    pub async fn build(self) -> TestServer {
        let upload_dir = tempfile::tempdir().unwrap();
        let ai = Arc::new(MockGenerativeBackend::new(&self.ai_reply));
        let ai_backend: Arc<dyn GenerativeBackend + Send + Sync> = ai.clone();

        let state = AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryLogRepository::new()),
            TokenConfig::new(TEST_SECRET, self.token_ttl_minutes),
            UploadStore::new(upload_dir.path()),
            Some(ai_backend),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state);
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}", addr),
            http: reqwest::Client::new(),
            ai,
            upload_dir,
            _server_handle: server_handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}
