//! Local storage for opsboard state
//!
//! The board keeps a single persisted artifact: the full task collection,
//! written as `board.snapshot.json` after every mutation. The remote data
//! source has no write endpoint, so this local mirror is the sync target
//! for the session's edits.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::BoardConfig;
use crate::error::{Error, Result};

/// File name of the persisted board snapshot
pub const BOARD_SNAPSHOT: &str = "board.snapshot.json";

/// Storage manager for opsboard state
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Create a storage manager rooted at the given data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Resolve the data directory from config, falling back to the
    /// platform-specific data dir
    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        if let Some(dir) = &config.data_dir {
            return Ok(Self::new(dir.clone()));
        }
        let dirs = ProjectDirs::from("", "", "opsboard").ok_or_else(|| {
            Error::OperationFailed("could not determine a data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }

    /// Path to the data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the persisted board snapshot
    pub fn board_snapshot_path(&self) -> PathBuf {
        self.data_dir.join(BOARD_SNAPSHOT)
    }

    /// Write JSON data atomically (write to temp, then rename)
    ///
    /// Ensures that concurrent readers never see partial writes.
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Read JSON data from a file, or `None` if the file does not exist
    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Write data atomically using temp file + rename
    pub fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }
}
