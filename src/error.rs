//! Error handling and custom error types
//!
//! Provides unified error handling across the adapter using thiserror.

use crate::storage::Operation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    /// Missing or unusable credentials and settings. Raised at construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The advertiser account could not be determined. Raised at construction.
    #[error("Advertiser resolution error: {0}")]
    Resolution(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    /// The platform rejected the call or answered without a populated `data` field.
    #[error("{message}")]
    Upload { message: String, body: String },

    #[error("Adapter does not support {operation} (path: {path})")]
    Unsupported { operation: Operation, path: String },

    #[error("Cache error: {0}")]
    Cache(String),
}

impl Error {
    /// Raw response body attached to an upload failure, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Upload { body, .. } => Some(body),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
