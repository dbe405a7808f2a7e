//! Error types for loading configuration and event data.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load profiling data from {path:?}: {message}")]
    Profile { path: PathBuf, message: String },

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("unsupported input file {0:?}, expected .json or .mm_profdata")]
    UnsupportedFormat(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
