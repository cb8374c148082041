use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DbError;
use crate::file_types::{file_type_info, FileCategory};

/// Persisted metadata for a document held by the search store.
///
/// `id` is the store-issued document id; it is never generated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    /// Human-readable size, e.g. "2.3 MB".
    pub size: String,
    pub created_at: DateTime<Utc>,
}

/// Row to insert once the search store has accepted a document.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub id: String,
    pub name: String,
    pub file_type: String,
    pub size: String,
}

impl NewDocument {
    /// Reject rows with blank required columns.
    pub fn validate(&self) -> Result<(), DbError> {
        let missing = [
            ("id", &self.id),
            ("name", &self.name),
            ("type", &self.file_type),
            ("size", &self.size),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match missing {
            Some((field, _)) => Err(DbError::InvalidRecord(format!(
                "File {} is required",
                field
            ))),
            None => Ok(()),
        }
    }
}

/// Partial update of a metadata row.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UpdateDocument {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub size: Option<String>,
}

impl UpdateDocument {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.file_type.is_none() && self.size.is_none()
    }
}

/// Listing entry returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub size: String,
    pub created_at: DateTime<Utc>,
    pub type_label: String,
    pub category: FileCategory,
}

impl From<DocumentMetadata> for DocumentResponse {
    fn from(doc: DocumentMetadata) -> Self {
        let info = file_type_info(&doc.file_type);
        DocumentResponse {
            id: doc.id,
            name: doc.name,
            file_type: doc.file_type,
            size: doc.size,
            created_at: doc.created_at,
            type_label: info.label.to_string(),
            category: info.category,
        }
    }
}
