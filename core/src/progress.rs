use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use crate::*;

/// On-disk shape of the progress file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct ProgressFile {
    #[serde(default)]
    completed_paintings: BTreeMap<String, bool>,
    /// Unix seconds of the last save.
    #[serde(default)]
    timestamp: i64,
}

/// Durable mapping from painting id to completion.
///
/// Entries are created on first completion and never removed except by an
/// explicit `reset`. Loading tolerates a missing file (empty store) and a
/// malformed one (logged, treated as empty); saving serializes fully in
/// memory before touching the file, so a failed write never leaves a partial
/// one behind and never changes the in-memory state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressStore {
    completed: BTreeMap<String, bool>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::new(),
            Err(err) => {
                log::warn!("Unreadable progress file {}: {err}", path.display());
                return Self::new();
            }
        };

        match serde_json::from_str::<ProgressFile>(&text) {
            Ok(file) => Self {
                completed: file.completed_paintings,
            },
            Err(err) => {
                log::warn!("Malformed progress file {}: {err}", path.display());
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = ProgressFile {
            completed_paintings: self.completed.clone(),
            timestamp: Utc::now().timestamp(),
        };
        let text = serde_json::to_string_pretty(&file).map_err(|err| {
            log::error!("Progress serialization failed: {err}");
            GameError::Persistence
        })?;
        std::fs::write(path, text).map_err(|err| {
            log::error!("Progress file {} not written: {err}", path.display());
            GameError::Persistence
        })
    }

    pub fn mark_completed(&mut self, id: &str) {
        self.completed.insert(id.to_owned(), true);
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.get(id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn reset(&mut self) {
        self.completed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::load(&dir.path().join("missing.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = ProgressStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn completion_survives_a_save_and_fresh_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let mut store = ProgressStore::new();
        store.mark_completed("gallery_01");
        store.save(&path).unwrap();

        let reloaded = ProgressStore::load(&path);
        assert!(reloaded.is_completed("gallery_01"));
        assert!(!reloaded.is_completed("gallery_02"));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn file_format_matches_the_documented_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");

        let mut store = ProgressStore::new();
        store.mark_completed("p1");
        store.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["completed_paintings"]["p1"], true);
        assert!(value["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn unwritable_path_fails_without_changing_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProgressStore::new();
        store.mark_completed("p1");

        // A directory path is not writable as a file.
        let outcome = store.save(dir.path());
        assert_eq!(outcome, Err(GameError::Persistence));
        assert!(store.is_completed("p1"));
    }

    #[test]
    fn reset_clears_every_entry() {
        let mut store = ProgressStore::new();
        store.mark_completed("p1");
        store.mark_completed("p2");
        store.reset();
        assert!(store.is_empty());
    }
}
