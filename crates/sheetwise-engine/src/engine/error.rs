//! Query errors.

use serde::Serialize;
use thiserror::Error;

use super::value::CellError;

/// Errors produced by the query engine. Each one is local to the query that
/// raised it.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryError {
    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("No row in {column} matches {key}")]
    LookupNotFound { column: String, key: String },

    #[error("No rows of {column} satisfy the selection")]
    EmptySelection { column: String },

    #[error("Position {position} is outside 1..={len}")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Date out of range")]
    DateOutOfRange,

    #[error("Invalid criterion: {criterion}")]
    InvalidCriterion { criterion: String },
}

impl QueryError {
    /// The spreadsheet error a formula would show for this failure.
    pub fn cell_error(&self) -> CellError {
        match self {
            QueryError::LookupNotFound { .. } | QueryError::PositionOutOfRange { .. } => {
                CellError::NotAvailable
            }
            QueryError::DivisionByZero | QueryError::EmptySelection { .. } => CellError::DivZero,
            _ => CellError::Value,
        }
    }
}
