use crate::config::ValidationError;
use crate::decode::DecodeError;
use crate::store::StoreError;
use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or running redirect handlers
#[derive(Error, Debug)]
pub enum UrlshortError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("could not load redirects from {path:?}: {source}")]
    SourceFile { path: PathBuf, source: DecodeError },

    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("destination cannot be used as a Location header: {0:?}")]
    InvalidDestination(String),

    #[error("failed to build response: {0}")]
    Http(#[from] http::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UrlshortError {
    /// Status code reported to the client when a handler fails with this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            UrlshortError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
