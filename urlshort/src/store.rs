//! Record stores hold the redirects served by [`crate::store_handler::StoreHandler`].
//!
//! A store is an external source of truth that may change between requests,
//! so callers are expected to query it instead of keeping copies around.
use crate::config::RecordStoreConfig;
use crate::decode::{DecodeError, parse_json};
use crate::record::Redirect;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("stored records could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    #[error("records could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Selects which records a query returns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    path: Option<String>,
}

impl Filter {
    /// Matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches records for a single path.
    pub fn path<P: Into<String>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn matches(&self, redirect: &Redirect) -> bool {
        self.path.as_deref().is_none_or(|path| path == redirect.path)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the matching records in insertion order.
    async fn find(&self, filter: &Filter) -> Result<Vec<Redirect>, StoreError>;

    async fn insert_many(&self, records: &[Redirect]) -> Result<(), StoreError>;

    /// Removes every record.
    async fn clear(&self) -> Result<(), StoreError>;
}

pub fn get_store(config: &RecordStoreConfig) -> Arc<dyn RecordStore> {
    match config {
        RecordStoreConfig::Memory => Arc::new(MemoryRecordStore::new()),
        RecordStoreConfig::Filesystem { path } => Arc::new(FilesystemRecordStore::new(path)),
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Redirect>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Redirect>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Redirect>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|redirect| filter.matches(redirect))
            .cloned()
            .collect())
    }

    async fn insert_many(&self, records: &[Redirect]) -> Result<(), StoreError> {
        self.records.write().await.extend_from_slice(records);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.records.write().await.clear();
        Ok(())
    }
}

/// Keeps records as a JSON array in a single file.
///
/// The file is read on every query, so edits made by other processes are
/// picked up immediately. A missing file is an empty store.
pub struct FilesystemRecordStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FilesystemRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FilesystemRecordStore {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Redirect>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(parse_json(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn save(&self, records: &[Redirect]) -> Result<(), StoreError> {
        let raw = serde_json::to_vec_pretty(records)?;

        // Write next to the target and rename so readers never see a partial file
        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, raw).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!(path = ?self.path, count = records.len(), "Stored redirects");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FilesystemRecordStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Redirect>, StoreError> {
        let mut records = self.load().await?;
        records.retain(|redirect| filter.matches(redirect));
        Ok(records)
    }

    async fn insert_many(&self, records: &[Redirect]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.load().await?;
        stored.extend_from_slice(records);
        self.save(&stored).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.save(&[]).await
    }
}
