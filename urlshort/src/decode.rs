//! Decoders turning YAML or JSON text into an ordered list of redirects.
//!
//! Both formats describe the same schema, a top-level sequence of mappings
//! with a `path` and a `url`:
//!
//! ```yaml
//! - path: /urlshort
//!   url: https://github.com/gophercises/urlshort
//! ```
//!
//! ```json
//! [{"path": "/urlshort", "url": "https://github.com/gophercises/urlshort"}]
//! ```
use crate::record::Redirect;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialization formats a redirect list can be decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn decode(&self, raw: &[u8]) -> Result<Vec<Redirect>, DecodeError> {
        match self {
            Format::Yaml => parse_yaml(raw),
            Format::Json => parse_json(raw),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

pub fn parse_yaml(raw: &[u8]) -> Result<Vec<Redirect>, DecodeError> {
    // A null document is an empty list
    let redirects: Option<Vec<Redirect>> = serde_yaml::from_slice(raw)?;
    Ok(redirects.unwrap_or_default())
}

pub fn parse_json(raw: &[u8]) -> Result<Vec<Redirect>, DecodeError> {
    Ok(serde_json::from_slice(raw)?)
}

pub fn parse_yaml_file(path: &Path) -> Result<Vec<Redirect>, DecodeError> {
    let raw = std::fs::read(path)?;
    parse_yaml(&raw)
}
