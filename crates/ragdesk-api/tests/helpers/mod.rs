//! Test helpers: build AppState and router for integration tests.
//!
//! The Google collaborators are replaced by in-process fakes and metadata lives
//! in `InMemoryDocumentRepository`, so no network or database is needed.
//! Run with `cargo test -p ragdesk-api`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use ragdesk_api::services::listing::ListingCache;
use ragdesk_api::setup::routes;
use ragdesk_api::state::{AiServices, AppState};
use ragdesk_core::config::RagdeskConfig;
use ragdesk_core::Config;
use ragdesk_db::InMemoryDocumentRepository;
use ragdesk_services::file_search::OperationResponse;
use ragdesk_services::{
    ChatEvent, ChatModel, ChatRequest, ChatStream, FileSearchStore, Operation, OperationError,
    ServiceError, ServiceResult, UploadRequest, VisionSummarizer,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

pub const STORE_NAME: &str = "fileSearchStores/test-store";
pub const DOCUMENT_ID: &str = "doc-123";

// ----- Search store -----

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeleteBehavior {
    Succeed,
    NotFound,
    Fail,
}

#[derive(Debug, Clone)]
pub struct StoreBehavior {
    /// Resource name reported once the operation is done; `None` omits it.
    pub document_name: Option<String>,
    /// Polls answered with `done: false` before completion.
    pub pending_polls: u32,
    pub operation_error: Option<String>,
    pub upload_fails: bool,
    pub delete: DeleteBehavior,
}

impl Default for StoreBehavior {
    fn default() -> Self {
        Self {
            document_name: Some(format!("{}/documents/{}", STORE_NAME, DOCUMENT_ID)),
            pending_polls: 1,
            operation_error: None,
            upload_fails: false,
            delete: DeleteBehavior::Succeed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub request: UploadRequest,
    /// File contents as read from the staged path during the upload call.
    pub contents: Vec<u8>,
}

#[derive(Default)]
pub struct FakeFileSearchStore {
    pub behavior: Mutex<StoreBehavior>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
    pub deletes: Mutex<Vec<(String, String)>>,
    remaining_polls: AtomicU32,
    pub polls: AtomicUsize,
}

impl FakeFileSearchStore {
    pub fn configure(&self, f: impl FnOnce(&mut StoreBehavior)) {
        f(&mut self.behavior.lock().unwrap());
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.deletes.lock().unwrap().clone()
    }

    fn operation(&self, done: bool) -> Operation {
        let behavior = self.behavior.lock().unwrap().clone();
        Operation {
            name: format!("{}/operations/op-1", STORE_NAME),
            done,
            error: behavior
                .operation_error
                .filter(|_| done)
                .map(|message| OperationError {
                    code: Some(3),
                    message: Some(message),
                }),
            response: behavior
                .document_name
                .filter(|_| done)
                .map(|name| OperationResponse {
                    document_name: Some(name),
                }),
        }
    }
}

#[async_trait]
impl FileSearchStore for FakeFileSearchStore {
    async fn upload_to_store(&self, request: UploadRequest) -> ServiceResult<Operation> {
        let behavior = self.behavior.lock().unwrap().clone();
        let contents = tokio::fs::read(&request.path).await?;
        self.uploads
            .lock()
            .unwrap()
            .push(RecordedUpload { request, contents });

        if behavior.upload_fails {
            return Err(ServiceError::Api {
                status: 500,
                message: "backend unavailable".to_string(),
            });
        }

        self.remaining_polls
            .store(behavior.pending_polls, Ordering::SeqCst);
        Ok(self.operation(behavior.pending_polls == 0))
    }

    async fn get_operation(&self, _operation_name: &str) -> ServiceResult<Operation> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.remaining_polls.load(Ordering::SeqCst);
        let remaining = remaining.saturating_sub(1);
        self.remaining_polls.store(remaining, Ordering::SeqCst);
        Ok(self.operation(remaining == 0))
    }

    async fn delete_document(&self, store_name: &str, document_id: &str) -> ServiceResult<()> {
        self.deletes
            .lock()
            .unwrap()
            .push((store_name.to_string(), document_id.to_string()));
        match self.behavior.lock().unwrap().delete {
            DeleteBehavior::Succeed => Ok(()),
            DeleteBehavior::NotFound => Err(ServiceError::NotFound(document_id.to_string())),
            DeleteBehavior::Fail => Err(ServiceError::Api {
                status: 500,
                message: "internal".to_string(),
            }),
        }
    }
}

// ----- Vision -----

pub struct FakeVision {
    /// `None` makes every call fail.
    pub summary: Mutex<Option<String>>,
    pub calls: Mutex<Vec<(Vec<u8>, String)>>,
}

impl Default for FakeVision {
    fn default() -> Self {
        Self {
            summary: Mutex::new(Some(
                "## High-level Summary\n- a cat on a sofa".to_string(),
            )),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VisionSummarizer for FakeVision {
    async fn summarize_image(&self, image: &[u8], mime_type: &str) -> ServiceResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((image.to_vec(), mime_type.to_string()));
        self.summary
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ServiceError::InvalidResponse("vision model returned no text".into()))
    }
}

// ----- Chat -----

#[derive(Default)]
pub struct FakeChat {
    pub events: Mutex<Vec<ServiceResult<ChatEvent>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChat {
    pub fn answer_with(&self, events: Vec<ServiceResult<ChatEvent>>) {
        *self.events.lock().unwrap() = events;
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeChat {
    async fn stream_chat(&self, request: ChatRequest) -> ServiceResult<ChatStream> {
        self.requests.lock().unwrap().push(request);
        let events: Vec<_> = self.events.lock().unwrap().drain(..).collect();

        let (tx, rx) = tokio::sync::mpsc::channel(events.len().max(1));
        for event in events {
            let _ = tx.send(event).await;
        }
        Ok(rx)
    }
}

// ----- App -----

pub struct TestApp {
    pub server: TestServer,
    pub documents: InMemoryDocumentRepository,
    pub store: Arc<FakeFileSearchStore>,
    pub vision: Arc<FakeVision>,
    pub chat: Arc<FakeChat>,
    pub state: Arc<AppState>,
    pub scratch_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Files currently left in the scratch directory.
    pub fn scratch_files(&self) -> usize {
        std::fs::read_dir(&self.scratch_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn test_config(scratch_dir: &std::path::Path) -> Config {
    let scratch = scratch_dir.display().to_string();
    Config::from_lookup(|key| {
        let value = match key {
            "DATABASE_URL" => "postgres://localhost/ragdesk_test",
            "FILE_SEARCH_STORE_NAME" => STORE_NAME,
            "GOOGLE_GENERATIVE_AI_API_KEY" => "test-key",
            "UPLOAD_POLL_INITIAL_INTERVAL_MS" => "1",
            "UPLOAD_POLL_MAX_INTERVAL_MS" => "5",
            "UPLOAD_POLL_TIMEOUT_SECS" => "5",
            "CHAT_MAX_DURATION_SECS" => "5",
            "UPLOAD_SCRATCH_DIR" => scratch.as_str(),
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Like [`setup_test_app`], with a hook to adjust configuration.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut RagdeskConfig)) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let scratch_dir = temp_dir.path().join("scratch");

    let mut config = test_config(&scratch_dir);
    configure(&mut config.0);

    let documents = InMemoryDocumentRepository::new();
    let store = Arc::new(FakeFileSearchStore::default());
    let vision = Arc::new(FakeVision::default());
    let chat = Arc::new(FakeChat::default());

    let state = Arc::new(AppState {
        config: config.clone(),
        documents: Arc::new(documents.clone()),
        ai: AiServices {
            store: store.clone(),
            vision: vision.clone(),
            chat: chat.clone(),
        },
        listing_cache: ListingCache::new(),
        shutdown: CancellationToken::new(),
    });

    let router = routes::build_router(&config, state.clone());
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        documents,
        store,
        vision,
        chat,
        state,
        scratch_dir,
        _temp_dir: temp_dir,
    }
}
