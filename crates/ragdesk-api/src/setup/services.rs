//! Service initialization and application state setup

use std::sync::Arc;

use anyhow::{Context, Result};
use ragdesk_core::Config;
use ragdesk_db::PostgresDocumentRepository;
use ragdesk_services::{GeminiChatModel, GeminiClient, GeminiFileSearchStore, GeminiVisionSummarizer};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::services::listing::ListingCache;
use crate::state::{AiServices, AppState};

/// Build the Google AI collaborators from configuration.
pub fn initialize_ai_services(config: &Config) -> Result<AiServices> {
    let google = config.google();
    let client = GeminiClient::new(google).context("Failed to build Google AI HTTP client")?;

    if google.api_key.is_none() {
        tracing::warn!("GOOGLE_GENERATIVE_AI_API_KEY is not set; uploads and chat will fail");
    }
    if google.file_search_store_name.is_none() {
        tracing::warn!("FILE_SEARCH_STORE_NAME is not set; uploads and chat will fail");
    }

    Ok(AiServices {
        store: Arc::new(GeminiFileSearchStore::new(client.clone())),
        vision: Arc::new(GeminiVisionSummarizer::new(
            client.clone(),
            google.vision_model.clone(),
        )),
        chat: Arc::new(GeminiChatModel::new(client, google.chat_model.clone())),
    })
}

/// Initialize all services and repositories, returning the application state
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let ai = initialize_ai_services(config)?;

    tracing::info!(
        vision_model = %config.google().vision_model,
        chat_model = %config.google().chat_model,
        scratch_dir = %config.scratch_dir().display(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        documents: Arc::new(PostgresDocumentRepository::new(pool)),
        ai,
        listing_cache: ListingCache::new(),
        shutdown: CancellationToken::new(),
    }))
}
