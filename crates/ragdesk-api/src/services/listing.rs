//! Document listing with a process-wide cache.

use std::sync::Arc;

use ragdesk_core::DocumentResponse;
use tokio::sync::RwLock;

use crate::state::AppState;

#[derive(Default)]
struct CacheSlot {
    generation: u64,
    entries: Option<Vec<DocumentResponse>>,
}

/// Last successful listing. Upload, rename and delete invalidate it.
///
/// Every invalidation bumps a generation. A listing read that started before
/// the bump is not stored, so an overlapping mutation cannot be masked.
#[derive(Clone, Default)]
pub struct ListingCache {
    slot: Arc<RwLock<CacheSlot>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached rows, or the generation a fresh read should be stored under.
    pub async fn lookup(&self) -> Result<Vec<DocumentResponse>, u64> {
        let slot = self.slot.read().await;
        match &slot.entries {
            Some(entries) => Ok(entries.clone()),
            None => Err(slot.generation),
        }
    }

    /// Store `documents` unless the cache was invalidated after `generation` was observed.
    pub async fn put(&self, generation: u64, documents: Vec<DocumentResponse>) -> bool {
        let mut slot = self.slot.write().await;
        if slot.generation != generation {
            return false;
        }
        slot.entries = Some(documents);
        true
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        slot.generation = slot.generation.wrapping_add(1);
        slot.entries = None;
    }
}

/// All documents, newest first. Read failures are logged and yield an empty list.
pub async fn list_documents(state: &AppState) -> Vec<DocumentResponse> {
    let generation = match state.listing_cache.lookup().await {
        Ok(cached) => return cached,
        Err(generation) => generation,
    };

    match state.documents.list().await {
        Ok(rows) => {
            let documents: Vec<DocumentResponse> =
                rows.into_iter().map(DocumentResponse::from).collect();
            if !state.listing_cache.put(generation, documents.clone()).await {
                tracing::debug!("Listing changed during read, not caching");
            }
            documents
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list documents");
            Vec::new()
        }
    }
}
