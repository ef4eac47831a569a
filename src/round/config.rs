use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RecallError};

pub const DEFAULT_ROWS: u32 = 4;
pub const DEFAULT_COLS: u32 = 4;
pub const DEFAULT_STARTING_TIME_SECS: f64 = 60.0;
pub const DEFAULT_REVEAL_DELAY_SECS: f64 = 0.25;
pub const MAX_CARDS: usize = 4096;

/// What to do with a grid whose card count is odd.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OddGridPolicy {
    #[default]
    Reject,
    /// Deal one symbol three times. The leftover card can never be matched,
    /// so such a round only ends on the clock.
    AllowTriple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GridPreset {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

impl GridPreset {
    pub fn geometry(self) -> (u32, u32) {
        match self {
            GridPreset::Easy => (3, 4),
            GridPreset::Normal => (4, 4),
            GridPreset::Hard => (4, 6),
            GridPreset::Expert => (6, 6),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GridPreset::Easy => "Easy",
            GridPreset::Normal => "Normal",
            GridPreset::Hard => "Hard",
            GridPreset::Expert => "Expert",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(GridPreset::Easy),
            "normal" => Some(GridPreset::Normal),
            "hard" => Some(GridPreset::Hard),
            "expert" => Some(GridPreset::Expert),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub rows: u32,
    pub cols: u32,
}

impl GridGeometry {
    pub fn total(self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: u32,
    pub cols: u32,
    pub starting_time_secs: f64,
    pub reveal_delay_secs: f64,
    pub odd_grid_policy: OddGridPolicy,
    /// Fixed shuffle seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    pub best_score_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            starting_time_secs: DEFAULT_STARTING_TIME_SECS,
            reveal_delay_secs: DEFAULT_REVEAL_DELAY_SECS,
            odd_grid_policy: OddGridPolicy::default(),
            seed: None,
            best_score_path: None,
        }
    }
}

impl GameConfig {
    pub fn from_preset(preset: GridPreset) -> Self {
        let (rows, cols) = preset.geometry();
        GameConfig {
            rows,
            cols,
            ..GameConfig::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, RecallError> {
        let raw = fs::read_to_string(path).map_err(|source| RecallError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| RecallError::ConfigJson {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<GridGeometry, ConfigError> {
        let (rows, cols) = (self.rows, self.cols);
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        let total = (rows as usize)
            .checked_mul(cols as usize)
            .filter(|total| *total <= MAX_CARDS)
            .ok_or(ConfigError::GridTooLarge {
                rows,
                cols,
                max: MAX_CARDS,
            })?;
        if total % 2 == 1 && self.odd_grid_policy == OddGridPolicy::Reject {
            return Err(ConfigError::OddGrid { rows, cols });
        }
        if !self.starting_time_secs.is_finite() || self.starting_time_secs <= 0.0 {
            return Err(ConfigError::InvalidStartingTime(self.starting_time_secs));
        }
        if !self.reveal_delay_secs.is_finite() || self.reveal_delay_secs < 0.0 {
            return Err(ConfigError::InvalidRevealDelay(self.reveal_delay_secs));
        }
        Ok(GridGeometry { rows, cols })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_four_by_four_minute_round() {
        let config = GameConfig::default();
        assert_eq!(config.validate(), Ok(GridGeometry { rows: 4, cols: 4 }));
        assert_eq!(config.reveal_delay_secs, 0.25);
        assert_eq!(config.starting_time_secs, 60.0);
    }

    #[test]
    fn rejects_unbuildable_grids() {
        let mut config = GameConfig {
            rows: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGrid { rows: 0, cols: 4 })
        );

        config.rows = 3;
        config.cols = 3;
        assert_eq!(
            config.validate(),
            Err(ConfigError::OddGrid { rows: 3, cols: 3 })
        );

        config.odd_grid_policy = OddGridPolicy::AllowTriple;
        assert_eq!(config.validate(), Ok(GridGeometry { rows: 3, cols: 3 }));

        config.rows = 1000;
        config.cols = 1000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_bad_timings() {
        let config = GameConfig {
            starting_time_secs: 0.0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidStartingTime(0.0))
        );

        let config = GameConfig {
            reveal_delay_secs: f64::NAN,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRevealDelay(_))
        ));
    }

    #[test]
    fn parses_partial_json_over_defaults() {
        let config = GameConfig::from_json_str(
            r#"{ "rows": 3, "cols": 5, "odd_grid_policy": "allow_triple", "seed": 7 }"#,
        )
        .unwrap();
        assert_eq!(config.rows, 3);
        assert_eq!(config.cols, 5);
        assert_eq!(config.odd_grid_policy, OddGridPolicy::AllowTriple);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.starting_time_secs, DEFAULT_STARTING_TIME_SECS);
    }

    #[test]
    fn presets_only_change_geometry() {
        let config = GameConfig::from_preset(GridPreset::Hard);
        assert_eq!((config.rows, config.cols), (4, 6));
        assert_eq!(GridPreset::from_name(" EXPERT "), Some(GridPreset::Expert));
        assert_eq!(GridPreset::from_name("tri"), None);
        for preset in [
            GridPreset::Easy,
            GridPreset::Normal,
            GridPreset::Hard,
            GridPreset::Expert,
        ] {
            assert!(GameConfig::from_preset(preset).validate().is_ok(), "{}", preset.name());
        }
    }
}
