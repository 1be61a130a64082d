use crate::record::{Redirect, RedirectTable};
use hyper::StatusCode;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Invalid fallback status code: {0}")]
    InvalidStatus(u16),

    #[error("Redirect paths cannot be empty")]
    EmptyRedirectPath,

    #[error("Source file path cannot be empty")]
    EmptyFilePath,
}

/// Redirect server configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for incoming requests
    pub listener: Listener,
    /// Response sent when no source has a redirect for the request path
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Redirect sources, consulted in order
    ///
    /// The first entry is the outermost handler: it answers first and falls
    /// back to the second, and so on down to the fallback response.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.fallback.validate()?;

        for source in &self.sources {
            source.validate()?;
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_status")]
    pub status: u16,
    #[serde(default = "default_fallback_body")]
    pub body: String,
}

fn default_fallback_status() -> u16 {
    200
}

fn default_fallback_body() -> String {
    "Hello, world!\n".into()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        FallbackConfig {
            status: default_fallback_status(),
            body: default_fallback_body(),
        }
    }
}

impl FallbackConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.status_code()?;
        Ok(())
    }

    pub fn status_code(&self) -> Result<StatusCode, ValidationError> {
        StatusCode::from_u16(self.status).map_err(|_| ValidationError::InvalidStatus(self.status))
    }
}

/// Where a layer of redirects comes from
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Redirects listed inline as a path to URL map
    Map { redirects: RedirectTable },
    /// A YAML file, read once at startup
    Yaml { path: PathBuf },
    /// A JSON file, read once at startup
    Json { path: PathBuf },
    /// A record store, queried on every request
    Store {
        store: RecordStoreConfig,
        /// Remove all stored records before seeding
        #[serde(default)]
        reset: bool,
        /// Records inserted into the store at startup
        #[serde(default)]
        seed: Vec<Redirect>,
    },
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            SourceConfig::Map { redirects } => {
                if redirects.keys().any(String::is_empty) {
                    return Err(ValidationError::EmptyRedirectPath);
                }
            }
            SourceConfig::Yaml { path } | SourceConfig::Json { path } => {
                if path.as_os_str().is_empty() {
                    return Err(ValidationError::EmptyFilePath);
                }
            }
            SourceConfig::Store { store, seed, .. } => {
                if let RecordStoreConfig::Filesystem { path } = store
                    && path.as_os_str().is_empty()
                {
                    return Err(ValidationError::EmptyFilePath);
                }
                if seed.iter().any(|redirect| redirect.path.is_empty()) {
                    return Err(ValidationError::EmptyRedirectPath);
                }
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Map { .. } => "map",
            SourceConfig::Yaml { .. } => "yaml",
            SourceConfig::Json { .. } => "json",
            SourceConfig::Store { .. } => "store",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordStoreConfig {
    Memory,
    Filesystem { path: PathBuf },
}
