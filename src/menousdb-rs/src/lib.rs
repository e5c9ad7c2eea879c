//! MenousDB Client Library
//!
//! HTTP client for the MenousDB REST API. Every operation sends a single
//! request and returns either the decoded JSON reply or the raw body.

mod client;

pub use client::Client;
pub use menousdb_core::{ClientConfig, Endpoint, Response};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no database specified")]
    NoDatabase,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
