//! Typed cell values.
//!
//! A loaded table never stores raw spreadsheet text: every cell is converted
//! into a [`Value`] once, at load time. Cells that could not be converted keep
//! their original text in [`Value::Invalid`] so they stay visible instead of
//! silently turning into zero.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt;

use super::datetime::{date_serial, time_serial};

/// Spreadsheet error codes produced by a computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellError {
    /// `#DIV/0!`
    DivZero,
    /// `#VALUE!`
    Value,
    /// `#N/A`
    NotAvailable,
}

impl CellError {
    pub fn code(self) -> &'static str {
        match self {
            CellError::DivZero => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::NotAvailable => "#N/A",
        }
    }

    /// Parse a spreadsheet error literal such as `#DIV/0!`.
    pub fn from_code(code: &str) -> Option<CellError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "#DIV/0!" => Some(CellError::DivZero),
            "#VALUE!" => Some(CellError::Value),
            "#N/A" => Some(CellError::NotAvailable),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Comparison form of text: trimmed and lowercased with Unicode rules.
/// Lookups and criteria both go through this.
pub fn fold_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// A single typed cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Source text that could not be converted to the column's type.
    Invalid { raw: String },
    Error(CellError),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Value {
        Value::Text(s.into())
    }

    pub fn invalid(raw: impl Into<String>) -> Value {
        Value::Invalid { raw: raw.into() }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Value::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Numeric view used by aggregates. Only real numbers qualify; text,
    /// dates and invalid cells are skipped the way SUM/AVERAGE skip them.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Serial-number view (dates and times as spreadsheet serials).
    pub fn as_serial(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Date(d) => Some(date_serial(*d)),
            Value::Time(t) => Some(time_serial(*t)),
            _ => None,
        }
    }

    /// Key equality used by lookups: text is compared case-insensitively
    /// after trimming, everything else by type.
    pub fn matches_key(&self, key: &Value) -> bool {
        match (self, key) {
            (Value::Text(a), Value::Text(b)) => fold_text(a) == fold_text(b),
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }

    /// Loose equality used when comparing against a resolved workbook's
    /// cached values, where dates come back as serial numbers.
    pub fn approx_eq(&self, other: &Value) -> bool {
        const EPSILON: f64 = 1e-6;
        match (self, other) {
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => fold_text(a) == fold_text(b),
            (Value::Empty, Value::Empty) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => match (self.as_serial(), other.as_serial()) {
                (Some(a), Some(b)) => (a - b).abs() <= EPSILON * a.abs().max(1.0),
                _ => false,
            },
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<CellError> for Value {
    fn from(e: CellError) -> Self {
        Value::Error(e)
    }
}
