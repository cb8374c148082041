use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ragdesk_core::{DbError, DocumentMetadata, NewDocument, UpdateDocument};
use sqlx::{PgPool, Postgres};

/// Metadata store operations used by the ingestion, deletion and listing paths.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a row for a document the search store has accepted.
    async fn insert(&self, document: NewDocument) -> Result<DocumentMetadata, DbError>;

    async fn get(&self, id: &str) -> Result<Option<DocumentMetadata>, DbError>;

    /// All rows, newest first.
    async fn list(&self) -> Result<Vec<DocumentMetadata>, DbError>;

    /// Apply a partial update. `DbError::NotFound` when no row matches.
    async fn update(&self, id: &str, changes: UpdateDocument)
        -> Result<DocumentMetadata, DbError>;

    /// Remove a row. `DbError::NotFound` when no row matches.
    async fn delete(&self, id: &str) -> Result<(), DbError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), DbError>;
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    name: String,
    #[sqlx(rename = "type")]
    file_type: String,
    size: String,
    created_at: DateTime<Utc>,
}

impl From<DocumentRow> for DocumentMetadata {
    fn from(row: DocumentRow) -> Self {
        DocumentMetadata {
            id: row.id,
            name: row.name,
            file_type: row.file_type,
            size: row.size,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed metadata store (`data_sources` table).
#[derive(Clone)]
pub struct PostgresDocumentRepository {
    pool: PgPool,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn duplicate_id(id: &str, err: DbError) -> DbError {
    match err {
        DbError::Duplicate(_) => DbError::Duplicate(format!(
            "A file with ID \"{}\" already exists in the database",
            id
        )),
        other => other,
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    #[tracing::instrument(skip(self, document), fields(db.table = "data_sources", db.operation = "insert", db.record_id = %document.id))]
    async fn insert(&self, document: NewDocument) -> Result<DocumentMetadata, DbError> {
        document.validate()?;

        let row = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            INSERT INTO data_sources (id, name, type, size)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, type, size, created_at
            "#,
        )
        .bind(&document.id)
        .bind(&document.name)
        .bind(&document.file_type)
        .bind(&document.size)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_id(&document.id, e.into()))?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "data_sources", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: &str) -> Result<Option<DocumentMetadata>, DbError> {
        let row = sqlx::query_as::<Postgres, DocumentRow>(
            "SELECT id, name, type, size, created_at FROM data_sources WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[tracing::instrument(skip(self), fields(db.table = "data_sources", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<DocumentMetadata>, DbError> {
        let rows = sqlx::query_as::<Postgres, DocumentRow>(
            "SELECT id, name, type, size, created_at FROM data_sources ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "data_sources", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        id: &str,
        changes: UpdateDocument,
    ) -> Result<DocumentMetadata, DbError> {
        if changes.is_empty() {
            return Err(DbError::InvalidRecord(
                "At least one field must be provided for update".to_string(),
            ));
        }

        let row = sqlx::query_as::<Postgres, DocumentRow>(
            r#"
            UPDATE data_sources
            SET name = COALESCE($2, name),
                type = COALESCE($3, type),
                size = COALESCE($4, size)
            WHERE id = $1
            RETURNING id, name, type, size, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.file_type)
        .bind(changes.size)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Into::into).ok_or(DbError::NotFound)
    }

    #[tracing::instrument(skip(self), fields(db.table = "data_sources", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM data_sources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
