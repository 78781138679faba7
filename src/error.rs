//! Level loading and configuration errors
//!
//! Anything wrong with a layout or a score table aborts the load; a board is
//! never partially constructed.

use thiserror::Error;

use crate::sim::BallColor;

/// Which score table a lookup was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTable {
    Increase,
    Decrease,
}

impl std::fmt::Display for ScoreTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreTable::Increase => f.write_str("score_increase_from_hole_capture"),
            ScoreTable::Decrease => f.write_str("score_decrease_from_wrong_hole"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("level index {index} out of range ({count} levels configured)")]
    LevelIndexOutOfRange { index: usize, count: usize },

    #[error("layout is empty")]
    EmptyLayout,

    #[error("'{marker}' at row {row}, column {col} is missing its colour digit")]
    MissingColorDigit { marker: char, row: usize, col: usize },

    #[error("unknown colour '{found}' at row {row}, column {col} (expected 0-4)")]
    UnknownColor { found: char, row: usize, col: usize },

    #[error("unknown ball colour name '{0}'")]
    UnknownColorName(String),

    #[error("hole at row {row}, column {col} does not fit inside the board")]
    HoleOutOfBounds { row: usize, col: usize },

    #[error("'{marker}' at row {row}, column {col} lands on an earlier hole")]
    HoleOverlap { marker: char, row: usize, col: usize },

    #[error("level defines no spawner")]
    NoSpawner,

    #[error("{table} has no entry for {color}")]
    MissingScoreEntry { color: BallColor, table: ScoreTable },

    #[error("invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: f32 },
}

/// Convenience alias: a `Result` using `LevelError` as the error type.
pub type LevelResult<T> = Result<T, LevelError>;
