//! Error types for sectorgrid

use thiserror::Error;

/// Main error type for sectorgrid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid domain: {0}")]
    InvalidDomain(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown distance unit: {0:?}")]
    UnknownUnit(String),

    #[error("Grid has no nodes: {rows} rows x {cols} columns")]
    DegenerateGrid { rows: usize, cols: usize },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sectorgrid operations
pub type Result<T> = std::result::Result<T, Error>;
