//! Persist the leaderboard to disk (XDG config or ~/.config/polyfall).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FILENAME: &str = "highscores.json";

/// Entries kept on disk.
pub const DEFAULT_CAPACITY: usize = 10;

/// Name stored when the player gave none.
pub const ANONYMOUS: &str = "anonymous";

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    /// Seconds since the Unix epoch.
    pub date: u64,
}

/// Best scores, highest first, at most `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
    capacity: usize,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

/// Returns the path to the leaderboard file (config dir / polyfall / highscores.json).
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join("polyfall").join(FILENAME)
}

impl Leaderboard {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Load from the default path. Missing or unreadable files give an empty board.
    pub fn load() -> Self {
        Self::load_from(&default_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let mut board = Self::default();
        let Ok(content) = fs::read(path) else {
            return board;
        };
        if let Ok(mut entries) = serde_json::from_slice::<Vec<ScoreEntry>>(&content) {
            entries.sort_by(|a, b| b.score.cmp(&a.score));
            entries.truncate(board.capacity);
            board.entries = entries;
        }
        board
    }

    /// Save to the default path. Creates the config directory if needed.
    pub fn save(&self) -> Result<(), HighScoreError> {
        self.save_to(&default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), HighScoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Insert a score. Returns its 0-based rank, or None if it did not make the board.
    pub fn record(&mut self, name: &str, score: u32, date: u64) -> Option<usize> {
        let name = match name.trim() {
            "" => ANONYMOUS,
            n => n,
        };
        // Equal scores keep their earlier entries ahead.
        let rank = self
            .entries
            .iter()
            .position(|e| e.score < score)
            .unwrap_or(self.entries.len());
        if rank >= self.capacity {
            return None;
        }
        self.entries.insert(
            rank,
            ScoreEntry {
                name: name.to_string(),
                score,
                date,
            },
        );
        self.entries.truncate(self.capacity);
        Some(rank)
    }

    pub fn top(&self, limit: usize) -> &[ScoreEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn best(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
