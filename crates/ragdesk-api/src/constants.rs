//! API constants

/// Prefix shared by every JSON endpoint.
pub const API_BASE: &str = "/api";

/// Header advertising the AI SDK UI message stream protocol on chat responses.
pub const UI_MESSAGE_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";
pub const UI_MESSAGE_STREAM_VERSION: &str = "v1";

/// Terminal data line of a chat stream.
pub const STREAM_DONE_MARKER: &str = "[DONE]";

pub const INVALID_DOCUMENT_ID_MESSAGE: &str = "Invalid document ID provided";
pub const DELETE_SUCCESS_MESSAGE: &str = "File deleted successfully";
pub const EMPTY_UPDATE_MESSAGE: &str = "At least one field must be provided for update";
pub const NO_MESSAGES_MESSAGE: &str = "No messages provided";

/// Headroom above the upload limit for multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
