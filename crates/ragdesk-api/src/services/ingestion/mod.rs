//! Ingestion pipeline
//!
//! validate -> resolve MIME -> stage -> (summarize images) -> upload ->
//! wait for the operation -> persist metadata. Staged files are removed on
//! every exit path by [`ScratchFiles`].

mod pipeline;
mod poll;
mod scratch;

pub use pipeline::{ingest, summary_display_name, IngestionOutcome, UploadedFile};
pub use poll::{wait_for_completion, Backoff};
pub use scratch::ScratchFiles;
