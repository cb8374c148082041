//! Document metadata persistence
//!
//! One table, keyed by the search store's document id. [`PostgresDocumentRepository`]
//! is the production implementation; [`InMemoryDocumentRepository`] backs tests
//! and local experiments without a database.

mod memory;
mod repository;

pub use memory::InMemoryDocumentRepository;
pub use repository::{DocumentRepository, PostgresDocumentRepository};
