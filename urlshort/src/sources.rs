//! Assembles the handler chain described by the configuration.
use crate::config::{Config, SourceConfig};
use crate::decode::{DecodeError, Format, parse_json, parse_yaml_file};
use crate::errors::UrlshortError;
use crate::factory::decoded_handler;
use crate::handler::{Handler, TextHandler};
use crate::lookup::map_handler;
use crate::record::Redirect;
use crate::store::get_store;
use crate::store_handler::StoreHandler;
use std::path::Path;

impl SourceConfig {
    /// The file and format of file-backed sources.
    pub fn file(&self) -> Option<(&Path, Format)> {
        match self {
            SourceConfig::Yaml { path } => Some((path.as_path(), Format::Yaml)),
            SourceConfig::Json { path } => Some((path.as_path(), Format::Json)),
            SourceConfig::Map { .. } | SourceConfig::Store { .. } => None,
        }
    }
}

/// Builds the configured sources into a single handler.
///
/// Sources are wrapped from last to first around the fallback response, so
/// the first source is consulted first. Stores are reset and seeded here.
pub async fn build_handler(config: &Config) -> Result<Box<dyn Handler>, UrlshortError> {
    let fallback = TextHandler::new(config.fallback.status_code()?, config.fallback.body.clone());

    let mut handler: Box<dyn Handler> = Box::new(fallback);
    for source in config.sources.iter().rev() {
        handler = wrap_source(source, handler).await?;
        tracing::info!(source = source.kind(), "Loaded redirect source");
    }

    Ok(handler)
}

async fn wrap_source(
    source: &SourceConfig,
    fallback: Box<dyn Handler>,
) -> Result<Box<dyn Handler>, UrlshortError> {
    let handler: Box<dyn Handler> = match source {
        SourceConfig::Map { redirects } => Box::new(map_handler(redirects.clone(), fallback)),
        SourceConfig::Yaml { .. } | SourceConfig::Json { .. } => {
            let Some((path, format)) = source.file() else {
                unreachable!("file-backed source without a file");
            };
            let source_error = |err| UrlshortError::SourceFile {
                path: path.to_path_buf(),
                source: err,
            };

            let raw = tokio::fs::read(path)
                .await
                .map_err(|e| source_error(DecodeError::Io(e)))?;
            Box::new(decoded_handler(&raw, format, fallback).map_err(source_error)?)
        }
        SourceConfig::Store { store, reset, seed } => {
            let store = get_store(store);
            if *reset {
                store.clear().await?;
            }
            if !seed.is_empty() {
                store.insert_many(seed).await?;
            }
            Box::new(StoreHandler::connect(store, fallback).await?)
        }
    };

    Ok(handler)
}

/// Reads and decodes a file-backed source without building a handler.
pub fn load_file(path: &Path, format: Format) -> Result<Vec<Redirect>, UrlshortError> {
    let result = match format {
        Format::Yaml => parse_yaml_file(path),
        Format::Json => std::fs::read(path)
            .map_err(DecodeError::from)
            .and_then(|raw| parse_json(&raw)),
    };

    result.map_err(|source| UrlshortError::SourceFile {
        path: path.to_path_buf(),
        source,
    })
}
