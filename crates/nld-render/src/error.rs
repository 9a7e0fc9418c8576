//! Render errors

use strum::Display;
use thiserror::Error;

/// Names the observation field or override an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Chars,
    Colors,
    Background,
    Cursor,
    ForegroundOverride,
    BackgroundOverride,
    Specials,
    Scores,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Shape mismatch in {field}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        field: Field,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Invalid {field} value {value} at row {row}, column {col}")]
    InvalidIndex {
        field: Field,
        row: usize,
        col: usize,
        value: i32,
    },

    #[error("Cursor ({row}, {col}) lies outside the terminal grid")]
    CursorOutOfBounds { row: i32, col: i32 },

    #[error("Non-finite score at row {row}, column {col}")]
    NonFiniteScore { row: usize, col: usize },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
