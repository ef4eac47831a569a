use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons a round refuses to start. No round state exists when one of these
/// is returned.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid needs at least one row and one column (got {rows}x{cols})")]
    EmptyGrid { rows: u32, cols: u32 },

    #[error("grid {rows}x{cols} exceeds the {max} card limit")]
    GridTooLarge { rows: u32, cols: u32, max: usize },

    #[error("grid {rows}x{cols} holds an odd number of cards, one symbol would never pair off")]
    OddGrid { rows: u32, cols: u32 },

    #[error("starting time must be a positive number of seconds (got {0})")]
    InvalidStartingTime(f64),

    #[error("reveal delay must be a non-negative number of seconds (got {0})")]
    InvalidRevealDelay(f64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("best score file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RecallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config {path} is not valid JSON: {source}")]
    ConfigJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_render_geometry() {
        let err = ConfigError::OddGrid { rows: 3, cols: 3 };
        assert!(err.to_string().contains("3x3"));

        let wrapped: RecallError = ConfigError::EmptyGrid { rows: 0, cols: 4 }.into();
        assert_eq!(
            wrapped.to_string(),
            "grid needs at least one row and one column (got 0x4)"
        );
    }
}
