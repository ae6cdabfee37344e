//! Persistence of the guessing game progress.
//!
//! The progress is stored as a single JSON document under a namespace key. The game only talks
//! to storage through the [`ProgressStore`] trait, so the backing can be a file, browser-like
//! key-value storage or memory.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::dataset::LocationRecord;
use crate::error::PhotomapError;

/// Namespace key the progress is stored under by default.
pub const DEFAULT_STORAGE_KEY: &str = "screensaver-geoguess";

/// Persisted state of the guessing game.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameProgress {
    /// Seed the order was shuffled with.
    pub seed: u64,
    /// Shuffled locations. Stored as is and never re-derived from the seed.
    pub order: Vec<LocationRecord>,
    /// Index of the current round in `order`.
    pub index: usize,
}

/// Durable storage for [`GameProgress`].
pub trait ProgressStore {
    /// Reads the stored progress. Returns `None` if nothing is stored or the stored value can't
    /// be decoded.
    fn load(&self) -> Option<GameProgress>;
    /// Replaces the stored progress.
    fn save(&mut self, progress: &GameProgress) -> Result<(), PhotomapError>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for Box<T> {
    fn load(&self) -> Option<GameProgress> {
        (**self).load()
    }

    fn save(&mut self, progress: &GameProgress) -> Result<(), PhotomapError> {
        (**self).save(progress)
    }
}

fn decode(raw: &str) -> Option<GameProgress> {
    match serde_json::from_str(raw) {
        Ok(progress) => Some(progress),
        Err(err) => {
            warn!("Stored game progress is corrupted and will be discarded: {err}");
            None
        }
    }
}

/// Keeps the encoded progress in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryProgressStore {
    raw: Option<String>,
}

impl MemoryProgressStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding the given encoded value.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// Encoded value currently stored.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Option<GameProgress> {
        self.raw.as_deref().and_then(decode)
    }

    fn save(&mut self, progress: &GameProgress) -> Result<(), PhotomapError> {
        self.raw = Some(serde_json::to_string(progress)?);
        Ok(())
    }
}

/// Stores the progress as a JSON file named after the storage key.
#[derive(Debug, Clone)]
pub struct FileProgressStore {
    file_path: PathBuf,
}

impl FileProgressStore {
    /// Creates a store keeping `<folder>/<key>.json`. The folder is created on the first save.
    pub fn new(folder: impl AsRef<Path>, key: &str) -> Self {
        Self {
            file_path: folder.as_ref().join(format!("{key}.json")),
        }
    }

    /// Path of the progress file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&self) -> Option<GameProgress> {
        match std::fs::read_to_string(&self.file_path) {
            Ok(raw) => decode(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stored game progress at {:?}", self.file_path);
                None
            }
            Err(err) => {
                warn!("Failed to read game progress {:?}: {err}", self.file_path);
                None
            }
        }
    }

    fn save(&mut self, progress: &GameProgress) -> Result<(), PhotomapError> {
        if let Some(folder) = self.file_path.parent() {
            std::fs::create_dir_all(folder)?;
        }

        std::fs::write(&self.file_path, serde_json::to_vec(progress)?)?;
        debug!(
            "Saved game progress (round {}) to {:?}",
            progress.index, self.file_path
        );

        Ok(())
    }
}
