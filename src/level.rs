//! Level configuration and scoring tables
//!
//! Mirrors the game's `config.json`: a list of levels plus two score tables
//! keyed by colour name. Reading the file is up to the host; this module only
//! turns the text into validated types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LevelError, LevelResult, ScoreTable};
use crate::sim::BallColor;

fn default_modifier() -> f32 {
    1.0
}

/// One level as it appears in the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Layout text, one row per line
    pub layout: String,
    /// Time limit in seconds
    pub time: f32,
    /// Seconds between spawn windows
    pub spawn_interval: f32,
    /// Colours pre-loaded into the primary spawner's queue
    #[serde(default)]
    pub balls: Vec<String>,
    #[serde(rename = "score_increase_from_hole_capture_modifier", default = "default_modifier")]
    pub score_increase_modifier: f32,
    #[serde(rename = "score_decrease_from_wrong_hole_modifier", default = "default_modifier")]
    pub score_decrease_modifier: f32,
}

impl LevelConfig {
    /// Layout rows (trailing carriage returns stripped)
    pub fn layout_rows(&self) -> Vec<&str> {
        self.layout.lines().map(|l| l.trim_end_matches('\r')).collect()
    }

    /// Queue colours, failing on any unknown name
    pub fn ball_colors(&self) -> LevelResult<Vec<BallColor>> {
        self.balls
            .iter()
            .map(|name| BallColor::from_name(name).ok_or_else(|| LevelError::UnknownColorName(name.clone())))
            .collect()
    }

    pub fn validate(&self) -> LevelResult<()> {
        if !self.time.is_finite() || self.time <= 0.0 {
            return Err(LevelError::InvalidValue {
                name: "time",
                value: self.time,
            });
        }
        if !self.spawn_interval.is_finite() || self.spawn_interval <= 0.0 {
            return Err(LevelError::InvalidValue {
                name: "spawn_interval",
                value: self.spawn_interval,
            });
        }
        for (name, value) in [
            ("score_increase_from_hole_capture_modifier", self.score_increase_modifier),
            ("score_decrease_from_wrong_hole_modifier", self.score_decrease_modifier),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LevelError::InvalidValue { name, value });
            }
        }
        Ok(())
    }
}

/// Whole-game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub levels: Vec<LevelConfig>,
    #[serde(rename = "score_increase_from_hole_capture", default)]
    pub score_increase: HashMap<String, i64>,
    #[serde(rename = "score_decrease_from_wrong_hole", default)]
    pub score_decrease: HashMap<String, i64>,
}

impl GameConfig {
    pub fn from_json(json: &str) -> LevelResult<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        log::info!("Loaded config with {} levels", config.levels.len());
        Ok(config)
    }

    pub fn level(&self, index: usize) -> LevelResult<&LevelConfig> {
        self.levels.get(index).ok_or(LevelError::LevelIndexOutOfRange {
            index,
            count: self.levels.len(),
        })
    }

    /// Score rules for a level: the global tables with that level's modifiers
    pub fn score_rules(&self, index: usize) -> LevelResult<ScoreRules> {
        let level = self.level(index)?;
        Ok(ScoreRules {
            increase: parse_table(&self.score_increase)?,
            decrease: parse_table(&self.score_decrease)?,
            increase_modifier: level.score_increase_modifier,
            decrease_modifier: level.score_decrease_modifier,
        })
    }
}

fn parse_table(raw: &HashMap<String, i64>) -> LevelResult<HashMap<BallColor, i64>> {
    raw.iter()
        .map(|(name, &value)| {
            BallColor::from_name(name)
                .map(|c| (c, value))
                .ok_or_else(|| LevelError::UnknownColorName(name.clone()))
        })
        .collect()
}

/// Per-colour capture scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRules {
    pub increase: HashMap<BallColor, i64>,
    pub decrease: HashMap<BallColor, i64>,
    pub increase_modifier: f32,
    pub decrease_modifier: f32,
}

impl ScoreRules {
    /// Points for sinking a ball of this colour in a matching hole
    pub fn reward(&self, color: BallColor) -> Option<i64> {
        self.increase
            .get(&color)
            .map(|&base| (base as f32 * self.increase_modifier).floor() as i64)
    }

    /// Points lost for sinking a ball of this colour in the wrong hole
    pub fn penalty(&self, color: BallColor) -> Option<i64> {
        self.decrease
            .get(&color)
            .map(|&base| (base as f32 * self.decrease_modifier).floor() as i64)
    }

    /// Every colour a ball can take on this level needs an entry in both tables
    pub fn validate<I>(&self, colors: I) -> LevelResult<()>
    where
        I: IntoIterator<Item = BallColor>,
    {
        for color in colors {
            if !self.increase.contains_key(&color) {
                return Err(LevelError::MissingScoreEntry {
                    color,
                    table: ScoreTable::Increase,
                });
            }
            if !self.decrease.contains_key(&color) {
                return Err(LevelError::MissingScoreEntry {
                    color,
                    table: ScoreTable::Decrease,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl ScoreRules {
    /// Same reward and penalty for every colour, no modifiers
    pub(crate) fn uniform(reward: i64, penalty: i64) -> Self {
        Self {
            increase: BallColor::ALL.iter().map(|&c| (c, reward)).collect(),
            decrease: BallColor::ALL.iter().map(|&c| (c, penalty)).collect(),
            increase_modifier: 1.0,
            decrease_modifier: 1.0,
        }
    }
}
