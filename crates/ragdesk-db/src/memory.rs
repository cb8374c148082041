use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use ragdesk_core::{DbError, DocumentMetadata, NewDocument, UpdateDocument};
use tokio::sync::Mutex;

use crate::repository::DocumentRepository;

/// In-process metadata store with the same semantics as the Postgres one.
///
/// `set_unavailable(true)` makes every call fail with a connection error.
#[derive(Clone, Default)]
pub struct InMemoryDocumentRepository {
    rows: Arc<Mutex<HashMap<String, DocumentMetadata>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Connection("in-memory store marked unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, document: NewDocument) -> Result<DocumentMetadata, DbError> {
        self.check_available()?;
        document.validate()?;

        let mut rows = self.rows.lock().await;
        if rows.contains_key(&document.id) {
            return Err(DbError::Duplicate(format!(
                "A file with ID \"{}\" already exists in the database",
                document.id
            )));
        }

        let row = DocumentMetadata {
            id: document.id,
            name: document.name,
            file_type: document.file_type,
            size: document.size,
            created_at: Utc::now(),
        };
        rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn get(&self, id: &str) -> Result<Option<DocumentMetadata>, DbError> {
        self.check_available()?;
        Ok(self.rows.lock().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentMetadata>, DbError> {
        self.check_available()?;
        let mut rows: Vec<_> = self.rows.lock().await.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update(
        &self,
        id: &str,
        changes: UpdateDocument,
    ) -> Result<DocumentMetadata, DbError> {
        self.check_available()?;
        if changes.is_empty() {
            return Err(DbError::InvalidRecord(
                "At least one field must be provided for update".to_string(),
            ));
        }

        let mut rows = self.rows.lock().await;
        let row = rows.get_mut(id).ok_or(DbError::NotFound)?;
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(file_type) = changes.file_type {
            row.file_type = file_type;
        }
        if let Some(size) = changes.size {
            row.size = size;
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DbError> {
        self.check_available()?;
        self.rows
            .lock()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.check_available()
    }
}
