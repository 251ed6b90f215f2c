use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use skyval_core::Scene;

/// Fixed storage key; the file store names its file after it.
pub const PROGRESS_KEY: &str = "skyval_progress";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress store i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("progress encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Highest scene the visitor has reached, persisted as `{"unlocked": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub unlocked: u8,
}

impl Default for Progress {
    fn default() -> Self {
        Self { unlocked: 1 }
    }
}

impl Progress {
    pub fn new(unlocked: u8) -> Self {
        Self {
            unlocked: unlocked.clamp(1, Scene::LAST.number()),
        }
    }

    /// Lenient parse. Numbers and numeric strings count, fractions truncate;
    /// absent, zero or malformed data means scene 1.
    pub fn parse(raw: &str) -> Self {
        let unlocked = serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(|v| match v.get("unlocked")? {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .filter(|n| n.is_finite() && *n >= 1.0);
        match unlocked {
            Some(n) => Self::new(n.min(u8::MAX as f64) as u8),
            None => Self::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

pub trait ProgressStore {
    /// Never fails: unreadable data falls back to [`Progress::default`].
    fn load(&self) -> Progress;
    fn save(&mut self, progress: &Progress) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// JSON file `<dir>/skyval_progress.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{PROGRESS_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for FileStore {
    fn load(&self) -> Progress {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Progress::parse(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => Progress::default(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable progress, starting over");
                Progress::default()
            }
        }
    }

    fn save(&mut self, progress: &Progress) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, progress.to_json()?)?;
        debug!(path = %self.path.display(), unlocked = progress.unlocked, "progress saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Raw-string store, the shape browser local storage has.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Progress {
        self.raw.as_deref().map(Progress::parse).unwrap_or_default()
    }

    fn save(&mut self, progress: &Progress) -> Result<(), StoreError> {
        self.raw = Some(progress.to_json()?);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.raw = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        assert_eq!(Progress::parse("").unlocked, 1);
        assert_eq!(Progress::parse("{}").unlocked, 1);
        assert_eq!(Progress::parse("{\"unlocked\":0}").unlocked, 1);
        assert_eq!(Progress::parse("{\"unlocked\":\"3\"}").unlocked, 3);
        assert_eq!(Progress::parse("{\"unlocked\":2.0}").unlocked, 2);
        assert_eq!(Progress::parse("{\"unlocked\":2.7}").unlocked, 2);
        assert_eq!(Progress::parse("{\"unlocked\":\"soon\"}").unlocked, 1);
        assert_eq!(Progress::parse("{\"unlocked\":true}").unlocked, 1);
        assert_eq!(Progress::parse("{\"unlocked\":-2}").unlocked, 1);
        assert_eq!(Progress::parse("not json").unlocked, 1);
        assert_eq!(Progress::parse("{\"unlocked\":3}").unlocked, 3);
        assert_eq!(Progress::parse("{\"unlocked\":99}").unlocked, 4);
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::default();
        assert_eq!(store.load(), Progress::default());
        store.save(&Progress::new(2)).unwrap();
        assert_eq!(store.raw(), Some("{\"unlocked\":2}"));
        assert_eq!(store.load().unlocked, 2);
        store.clear().unwrap();
        assert_eq!(store.load().unlocked, 1);
        assert_eq!(MemoryStore::with_raw("{oops").load().unlocked, 1);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("skyval-progress-{}", std::process::id()));
        let mut store = FileStore::in_dir(&dir);
        assert_eq!(store.load().unlocked, 1);
        store.save(&Progress::new(3)).unwrap();
        assert_eq!(store.load().unlocked, 3);
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unlocked, 1);
        let _ = fs::remove_dir_all(&dir);
    }
}
