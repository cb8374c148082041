//! Data models

mod document;

pub use document::*;
