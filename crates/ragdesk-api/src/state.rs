//! Application state shared by every handler.

use std::sync::Arc;

use ragdesk_core::Config;
use ragdesk_db::DocumentRepository;
use ragdesk_services::{ChatModel, FileSearchStore, VisionSummarizer};
use tokio_util::sync::CancellationToken;

use crate::services::listing::ListingCache;

/// Hosted-service collaborators, each behind its trait.
#[derive(Clone)]
pub struct AiServices {
    pub store: Arc<dyn FileSearchStore>,
    pub vision: Arc<dyn VisionSummarizer>,
    pub chat: Arc<dyn ChatModel>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub documents: Arc<dyn DocumentRepository>,
    pub ai: AiServices,
    pub listing_cache: ListingCache,
    /// Cancelled when the server starts shutting down; in-flight completion
    /// waits observe it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// The configured store resource id, or `NotConfigured` when absent.
    pub fn store_name(&self) -> Result<String, ragdesk_core::AppError> {
        self.config
            .google()
            .file_search_store_name
            .clone()
            .ok_or_else(|| {
                ragdesk_core::AppError::NotConfigured(
                    "FILE_SEARCH_STORE_NAME is not set".to_string(),
                )
            })
    }
}
