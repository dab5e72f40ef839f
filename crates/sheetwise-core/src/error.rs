//! Error types for Sheetwise core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading datasets or configuration.
#[derive(Error, Debug)]
pub enum SheetwiseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("{}: expected {expected} columns, found {found}", path.display())]
    Schema {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SheetwiseError>;
