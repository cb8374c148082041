//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::services::chat_proxy::{ChatRequestBody, SelectedDataSource, UiMessage, UiMessagePart};
use crate::services::deletion::DeleteResponse;
use ragdesk_core::file_types::FileCategory;
use ragdesk_core::{DocumentResponse, UpdateDocument};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ragdesk API",
        version = "0.1.0",
        description = "Upload documents into a hosted File Search store, manage their metadata and chat with answers grounded in them."
    ),
    paths(
        handlers::health::health_check,
        handlers::upload::upload_file,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::update_document,
        handlers::documents::delete_document,
        handlers::chat::chat,
    ),
    components(schemas(
        ErrorResponse,
        DocumentResponse,
        FileCategory,
        UpdateDocument,
        DeleteResponse,
        handlers::upload::UploadResponse,
        handlers::health::HealthResponse,
        ChatRequestBody,
        UiMessage,
        UiMessagePart,
        SelectedDataSource,
    )),
    tags(
        (name = "documents", description = "Document ingestion and metadata"),
        (name = "chat", description = "Grounded chat over uploaded documents"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/health",
            "/api/embeddings/upload",
            "/api/documents",
            "/api/documents/{id}",
            "/api/chat",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
