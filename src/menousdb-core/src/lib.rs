//! MenousDB Core Library
//!
//! Shared types for talking to a MenousDB server:
//! - Endpoint catalog (path, method, required headers, response format)
//! - Response model with text fallback
//! - Request bodies
//! - Client configuration

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::*;
