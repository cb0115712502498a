/*
[INPUT]:  Store operations from the runner services, JSON file on disk
[OUTPUT]: Store that persists every mutation to a single JSON document
[POS]:    Persistence layer - durable backend for the CLI
[UPDATE]: When the Store trait or on-disk layout changes
*/

use super::{StoreData, StoreResult, impl_store_for};
use crate::error::StoreError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Store backed by `store.json`
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Open the store at `<data dir>/edutask/store.json`
    pub async fn open_default() -> StoreResult<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| {
                StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not determine data directory",
                ))
            })?
            .join("edutask");
        Self::open(data_dir.join("store.json")).await
    }

    /// Open the store at `path`, starting empty when the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let data = Self::load(&path).await?;
        debug!(path = %path.display(), "store opened");
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> StoreResult<StoreData> {
        if !path.exists() {
            return Ok(StoreData::default());
        }
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn read<R>(&self, f: impl FnOnce(&StoreData) -> StoreResult<R>) -> StoreResult<R> {
        let data = self.data.lock().await;
        f(&data)
    }

    /// Apply a mutation and persist it; a failed mutation leaves the file untouched
    async fn write<R>(&self, f: impl FnOnce(&mut StoreData) -> StoreResult<R>) -> StoreResult<R> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let result = f(&mut next)?;
        self.save(&next).await?;
        *data = next;
        Ok(result)
    }

    async fn save(&self, data: &StoreData) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(data)?;

        // Atomic write: write to temp file then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

impl_store_for!(JsonFileStore);
