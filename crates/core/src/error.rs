//! Error types for terrashade

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for terrashade operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists and is readable but is neither a TIFF nor an ASCII grid.
    #[error("Unrecognized raster format: {}", path.display())]
    UnrecognizedFormat { path: PathBuf },

    #[error("Malformed raster: {0}")]
    Format(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid configuration: {name} = {value} ({reason})")]
    Config {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Grid shape mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    ShapeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

impl Error {
    /// Shorthand for a [`Error::Config`] with a displayable value.
    pub fn config(name: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Error::Config {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures reading the input file (including unknown formats).
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::UnrecognizedFormat { .. })
    }
}

/// Result type alias for terrashade operations
pub type Result<T> = std::result::Result<T, Error>;
