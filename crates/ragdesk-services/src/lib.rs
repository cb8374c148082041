//! Hosted service clients
//!
//! Everything the application delegates to Google's Generative Language API:
//! the File Search store (document ingestion, operations, deletion), the vision
//! model that turns images into Markdown, and the streaming chat model. Each
//! collaborator sits behind a trait so request handlers can be exercised with
//! fakes.

pub mod chat;
pub mod error;
pub mod file_search;
pub mod gemini;
pub mod vision;

pub use chat::{ChatEvent, ChatModel, ChatRequest, ChatStream, GeminiChatModel};
pub use error::{ServiceError, ServiceResult};
pub use file_search::{
    CustomMetadata, FileSearchStore, GeminiFileSearchStore, Operation, OperationError,
    UploadRequest,
};
pub use gemini::GeminiClient;
pub use vision::{build_summary_document, GeminiVisionSummarizer, VisionSummarizer};
