use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;

const BEST_SCORE_FILE_NAME: &str = "best_score.json";
const APP_DIR_NAME: &str = "recall-round";

pub trait BestScoreStore {
    fn read_best_score(&self) -> u32;
    fn write_best_score(&self, score: u32) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    best: Cell<u32>,
}

impl MemoryStore {
    pub fn new(best: u32) -> Self {
        MemoryStore {
            best: Cell::new(best),
        }
    }
}

impl BestScoreStore for MemoryStore {
    fn read_best_score(&self) -> u32 {
        self.best.get()
    }

    fn write_best_score(&self, score: u32) -> Result<(), StoreError> {
        self.best.set(score);
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct BestScoreDocument {
    best_score: u32,
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn at_default_location() -> Self {
        Self::new(default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<u32, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let document: BestScoreDocument =
            serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        Ok(document.best_score)
    }
}

impl BestScoreStore for JsonFileStore {
    fn read_best_score(&self) -> u32 {
        match self.load() {
            Ok(best) => best,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable best score");
                0
            }
        }
    }

    fn write_best_score(&self, score: u32) -> Result<(), StoreError> {
        let document = BestScoreDocument { best_score: score };
        let data = serde_json::to_string_pretty(&document).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &data).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)
}

#[cfg(feature = "glib")]
fn config_dir() -> PathBuf {
    glib::user_config_dir()
}

#[cfg(not(feature = "glib"))]
fn config_dir() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_path() -> PathBuf {
    config_dir().join(APP_DIR_NAME).join(BEST_SCORE_FILE_NAME)
}
