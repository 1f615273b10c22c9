//! Resume positions keyed by source URL

use crate::utils::error::{IntoPlayerError, Result};
use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Store of last playback positions
///
/// `key` is the source URL; sources without one (asset handles) pass None.
pub trait ProgressManager: Send + Sync {
    /// Saved position in milliseconds, 0 when nothing is stored
    fn saved_progress(&self, key: Option<&str>) -> u64;

    /// Remember a position; 0 erases the resume point
    fn save_progress(&self, key: Option<&str>, position_ms: u64);
}

/// In-process store, forgotten on exit
#[derive(Debug, Default)]
pub struct MemoryProgressManager {
    positions: Mutex<HashMap<String, u64>>,
}

impl MemoryProgressManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressManager for MemoryProgressManager {
    fn saved_progress(&self, key: Option<&str>) -> u64 {
        key.and_then(|k| self.positions.lock().get(k).copied())
            .unwrap_or(0)
    }

    fn save_progress(&self, key: Option<&str>, position_ms: u64) {
        let Some(key) = key else { return };
        let mut positions = self.positions.lock();
        if position_ms == 0 {
            positions.remove(key);
        } else {
            positions.insert(key.to_string(), position_ms);
        }
    }
}

/// On-disk layout of the JSON store
#[derive(Debug, Default, Serialize, Deserialize)]
struct PositionHistory {
    /// Map of source URL to last position
    positions: HashMap<String, PositionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PositionEntry {
    /// Last position in milliseconds
    position_ms: u64,

    /// Unix timestamp of the save
    saved_at: u64,
}

/// Persistent store in a JSON file
///
/// Every save rewrites the file; write failures are logged and the
/// in-memory copy stays authoritative.
#[derive(Debug)]
pub struct JsonProgressManager {
    path: PathBuf,
    history: Mutex<PositionHistory>,
}

impl JsonProgressManager {
    /// Open the store at the default location under the config directory
    pub fn open_default() -> Result<Self> {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("tsplayer");
        path.push("position_history.json");
        Self::open(path)
    }

    /// Open or create the store at `path`
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let history = if path.exists() {
            let data = std::fs::read_to_string(&path).progress_err("reading position history")?;
            serde_json::from_str(&data).progress_err("parsing position history")?
        } else {
            PositionHistory::default()
        };

        Ok(Self {
            path,
            history: Mutex::new(history),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_to_disk(&self, history: &PositionHistory) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(history)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl ProgressManager for JsonProgressManager {
    fn saved_progress(&self, key: Option<&str>) -> u64 {
        key.and_then(|k| self.history.lock().positions.get(k).map(|e| e.position_ms))
            .unwrap_or(0)
    }

    fn save_progress(&self, key: Option<&str>, position_ms: u64) {
        let Some(key) = key else { return };
        let mut history = self.history.lock();

        if position_ms == 0 {
            if history.positions.remove(key).is_none() {
                return;
            }
        } else {
            let saved_at = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            history.positions.insert(
                key.to_string(),
                PositionEntry {
                    position_ms,
                    saved_at,
                },
            );
        }

        debug!("Saved progress {} -> {}", key, position_ms);
        if let Err(e) = self.save_to_disk(&history) {
            warn!("Failed to persist position history: {}", e);
        }
    }
}
