//! Raw sheet contents before any schema is applied.

use std::collections::HashMap;
use std::path::PathBuf;

use sheetwise_engine::engine::CellRef;

/// A cell exactly as the file stored it.
#[derive(Clone, Debug, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Workbook date/time stored as a serial number.
    Serial(f64),
    /// Error literal such as `#DIV/0!`.
    Error(String),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form used for headers and parse-issue reports.
    pub fn to_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) | RawCell::Serial(n) => n.to_string(),
            RawCell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            RawCell::Error(e) => e.clone(),
        }
    }
}

/// The first sheet of a file: cached values plus any formula text.
#[derive(Clone, Debug, Default)]
pub struct RawSheet {
    pub path: PathBuf,
    /// Rows in sheet order starting at row 1; column 0 is `A`.
    pub rows: Vec<Vec<RawCell>>,
    /// Formula text keyed by cell, with a leading `=`.
    pub formulas: HashMap<CellRef, String>,
}

impl RawSheet {
    pub fn new(path: impl Into<PathBuf>) -> RawSheet {
        RawSheet {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn cell(&self, cell: &CellRef) -> &RawCell {
        static EMPTY: RawCell = RawCell::Empty;
        self.rows
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .unwrap_or(&EMPTY)
    }

    /// Place a value at absolute coordinates, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: RawCell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, RawCell::Empty);
        }
        cells[col] = value;
    }

    pub fn set_formula(&mut self, cell: CellRef, formula: &str) {
        let formula = formula.trim();
        if formula.is_empty() {
            return;
        }
        let normalized = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={formula}")
        };
        self.formulas.insert(cell, normalized);
    }
}
