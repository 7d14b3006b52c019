//! File-based session persistence.
//!
//! Snapshots are stored as individual bincode files indexed by round, with a
//! JSON export for inspection. Writes go through a temp file and an atomic
//! rename so a crash mid-write never corrupts the latest snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::session::SessionSnapshot;

/// Stores session snapshots as `session_{round}.bin` under one directory.
pub struct SessionStore {
    base_dir: PathBuf,
}

impl SessionStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, round: u32) -> PathBuf {
        self.base_dir.join(format!("session_{round}.bin"))
    }

    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let path = self.snapshot_path(snapshot.round);
        let temp_path = path.with_extension("bin.tmp");

        let bytes = bincode::serialize(snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(round = snapshot.round, path = %path.display(), "saved snapshot");
        Ok(())
    }

    pub fn load(&self, round: u32) -> Result<Option<SessionSnapshot>, StoreError> {
        let path = self.snapshot_path(round);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let snapshot = bincode::deserialize(&bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        tracing::debug!(round, path = %path.display(), "loaded snapshot");
        Ok(Some(snapshot))
    }

    /// Loads the most recent snapshot, if any.
    pub fn load_latest(&self) -> Result<Option<SessionSnapshot>, StoreError> {
        match self.list_rounds()?.last() {
            Some(&round) => self.load(round),
            None => Ok(None),
        }
    }

    /// Rounds with a stored snapshot, ascending.
    pub fn list_rounds(&self) -> Result<Vec<u32>, StoreError> {
        let mut rounds = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(round_str) = filename
                    .strip_prefix("session_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(round) = round_str.parse::<u32>()
            {
                rounds.push(round);
            }
        }
        rounds.sort_unstable();
        Ok(rounds)
    }

    /// Writes a human-readable JSON copy of a snapshot next to the binary
    /// files, for debugging.
    pub fn export_json(&self, snapshot: &SessionSnapshot) -> Result<PathBuf, StoreError> {
        let path = self.base_dir.join(format!("session_{}.json", snapshot.round));
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
