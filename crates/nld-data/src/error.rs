//! Dataset errors

use std::path::PathBuf;

use ndarray_npy::ReadNpzError;
use thiserror::Error;

use nld_render::RenderError;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file {path} could not be opened: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Array archive error: {0}")]
    Npz(#[from] ReadNpzError),

    #[error("Session file has no `{0}` array")]
    MissingField(String),

    #[error("Array `{field}` has shape {found:?}, expected {expected}")]
    ShapeMismatch {
        field: String,
        expected: String,
        found: Vec<usize>,
    },

    #[error("Array `{field}` has {found} timesteps, expected {expected}")]
    TimestepMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("Timestep {step} is out of range for a session of {len} steps")]
    StepOutOfRange { step: usize, len: usize },

    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Invalid observation: {0}")]
    Render(#[from] RenderError),
}
