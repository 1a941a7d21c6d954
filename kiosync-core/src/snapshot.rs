// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local snapshot store
//!
//! Persists the last-known-good multi-language payload as one JSON
//! document in the cache directory, using atomic writes to prevent
//! partial files on crash/interruption. Merging never happens here;
//! a write fully replaces the previous snapshot.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::types::MultiLanguageSnapshot;

const SNAPSHOT_FILE: &str = "snapshot.json";
const ASSETS_DIR: &str = "assets";

/// Durable store for the multi-language snapshot.
pub struct SnapshotStore {
    cache_dir: PathBuf,
}

impl SnapshotStore {
    /// Opens (and creates if needed) the cache directory.
    pub fn new(cache_dir: &Path) -> Result<Self, SnapshotError> {
        fs::create_dir_all(cache_dir)?;
        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
        })
    }

    /// Reads the last persisted snapshot.
    ///
    /// A missing or corrupt file degrades to `None`; corruption is
    /// logged and the cache treated as empty.
    pub fn read(&self) -> Option<MultiLanguageSnapshot> {
        let path = self.snapshot_path();
        let data = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt snapshot file, ignoring");
                None
            }
        }
    }

    /// Replaces the persisted snapshot wholesale.
    pub fn write(&self, snapshot: &MultiLanguageSnapshot) -> Result<(), SnapshotError> {
        let data = serde_json::to_string(snapshot)?;
        atomic_write(&self.snapshot_path(), data.as_bytes())
    }

    /// True if a snapshot has ever been persisted.
    pub fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }

    /// Removes the snapshot file, keeping downloaded assets.
    pub fn clear(&self) -> Result<(), SnapshotError> {
        let path = self.snapshot_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Removes the snapshot file and the asset directory.
    pub fn clear_all(&self) -> Result<(), SnapshotError> {
        self.clear()?;
        let assets = self.assets_dir();
        if assets.exists() {
            fs::remove_dir_all(&assets)?;
        }
        Ok(())
    }

    /// Directory where the asset store keeps downloaded files.
    pub fn assets_dir(&self) -> PathBuf {
        self.cache_dir.join(ASSETS_DIR)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }
}

/// Atomic file write (write to temp, then rename)
///
/// Either the old content remains or the new content is fully written.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), SnapshotError> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Errors that can occur with the snapshot store
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
