//! ragdesk API library
//!
//! Exposes the router and state so integration tests can drive the HTTP
//! surface without binding a socket.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;
