//! ragdesk core library
//!
//! Domain model, error taxonomy, configuration and upload validation shared by
//! every ragdesk crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod file_types;
pub mod format;
pub mod models;
pub mod validation;

pub use config::{Config, GoogleAiConfig, PollSettings};
pub use error::{AppError, DbError, ErrorMetadata, LogLevel};
pub use models::{DocumentMetadata, DocumentResponse, NewDocument, UpdateDocument};
pub use validation::ValidationError;
