//! Instructor ("resolved") copies of the datasets and their stored formulas.
//!
//! Formula text is treated as opaque: it is read, cleaned up for display and
//! compared as text. It is never evaluated.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use sheetwise_engine::engine::datetime::{date_from_serial, time_from_serial};
use sheetwise_engine::engine::{CellError, CellRef, Value};

use crate::error::Result;
use crate::storage::{RawCell, RawSheet, read_sheet};

fn engine_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)_xl(?:fn|ws|udf)\.").expect("prefix regex must compile"))
}

/// A resolved spreadsheet, opened once per render.
#[derive(Clone, Debug)]
pub struct ResolvedSheet {
    sheet: RawSheet,
}

impl ResolvedSheet {
    pub fn open(path: &Path) -> Result<ResolvedSheet> {
        Ok(ResolvedSheet {
            sheet: read_sheet(path)?,
        })
    }

    pub fn from_sheet(sheet: RawSheet) -> ResolvedSheet {
        ResolvedSheet { sheet }
    }

    pub fn path(&self) -> &Path {
        &self.sheet.path
    }

    /// Stored formula at `cell` with engine prefixes stripped, or an empty
    /// string when the cell has none.
    pub fn formula(&self, cell: &CellRef) -> String {
        self.sheet
            .formulas
            .get(cell)
            .map(|f| strip_engine_prefixes(f.as_str()))
            .unwrap_or_default()
    }

    /// Cached value of `cell`, when the file stores one.
    ///
    /// `like` decides how a bare serial number is read back: workbooks keep
    /// dates and times as numbers.
    pub fn cached_value(&self, cell: &CellRef, like: &Value) -> Option<Value> {
        let value = match self.sheet.cell(cell) {
            RawCell::Empty => return None,
            RawCell::Text(s) if s.trim().is_empty() => return None,
            RawCell::Text(s) => Value::text(s.trim()),
            RawCell::Bool(b) => Value::Bool(*b),
            RawCell::Error(code) => CellError::from_code(code)
                .map(Value::Error)
                .unwrap_or_else(|| Value::invalid(code.clone())),
            RawCell::Number(n) | RawCell::Serial(n) => match like {
                Value::Date(_) => date_from_serial(*n).map_or(Value::Number(*n), Value::Date),
                Value::Time(_) => time_from_serial(*n).map_or(Value::Number(*n), Value::Time),
                _ => Value::Number(*n),
            },
        };
        Some(value)
    }
}

/// Remove the `_xlfn.` / `_xlws.` / `_xludf.` markers that newer functions
/// carry in the file format, and make sure the text starts with `=`.
pub fn strip_engine_prefixes(formula: &str) -> String {
    let stripped = engine_prefix_re().replace_all(formula.trim(), "");
    if stripped.is_empty() || stripped.starts_with('=') {
        stripped.into_owned()
    } else {
        format!("={stripped}")
    }
}

/// Canonical form for comparing two formulas: no leading `=`, engine
/// prefixes removed, upper case and no whitespace outside string literals.
pub fn normalize_formula(formula: &str) -> String {
    let stripped = strip_engine_prefixes(formula);
    let body = stripped.strip_prefix('=').unwrap_or(&stripped);
    let mut out = String::with_capacity(body.len());
    let mut in_string = false;
    for c in body.chars() {
        if c == '"' {
            in_string = !in_string;
            out.push(c);
        } else if in_string {
            out.push(c);
        } else if !c.is_whitespace() {
            out.extend(c.to_uppercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_csv_content;
    use sheetwise_engine::engine::datetime::date_of;

    #[test]
    fn test_strips_every_prefix_form() {
        assert_eq!(
            strip_engine_prefixes("_xlfn.XLOOKUP(\"Irene Clark\",B2:B11,C2:C11)"),
            "=XLOOKUP(\"Irene Clark\",B2:B11,C2:C11)"
        );
        assert_eq!(
            strip_engine_prefixes("=_xlfn._xlws.SORT(A2:A11)"),
            "=SORT(A2:A11)"
        );
        assert_eq!(strip_engine_prefixes("=_XLFN.MAXIFS(D2:D11)"), "=MAXIFS(D2:D11)");
        assert_eq!(strip_engine_prefixes(""), "");
    }

    #[test]
    fn test_normalize_keeps_string_literals() {
        assert_eq!(
            normalize_formula("= countif( C2:C11 , \"Sales Team\" )"),
            "COUNTIF(C2:C11,\"Sales Team\")"
        );
        assert_eq!(
            normalize_formula("=_xlfn.MINIFS(D2:D11,E2:E11,\">=5\")"),
            normalize_formula("MINIFS(D2:D11, E2:E11, \">=5\")")
        );
        assert_ne!(
            normalize_formula("=COUNTIF(C2:C11,\"sales\")"),
            normalize_formula("=COUNTIF(C2:C11,\"Sales\")")
        );
    }

    #[test]
    fn test_formula_lookup_by_cell() {
        let sheet = parse_csv_content(
            Path::new("resolved.csv"),
            "Name,Result\nCarol,\"=_xlfn.XLOOKUP(\"\"Carol\"\",A2:A2,A2:A2)\"\n",
        );
        let resolved = ResolvedSheet::from_sheet(sheet);
        let cell = CellRef::parse("B2").unwrap();
        assert_eq!(resolved.formula(&cell), "=XLOOKUP(\"Carol\",A2:A2,A2:A2)");
        assert_eq!(resolved.formula(&CellRef::parse("C9").unwrap()), "");
        assert_eq!(resolved.cached_value(&cell, &Value::Empty), None);
    }

    #[test]
    fn test_cached_serial_reads_back_as_date() {
        let mut sheet = RawSheet::new("resolved.xlsx");
        sheet.set(1, 5, RawCell::Serial(45384.0));
        let resolved = ResolvedSheet::from_sheet(sheet);
        let like = Value::Date(date_of(2024, 1, 1).unwrap());
        assert_eq!(
            resolved.cached_value(&CellRef::new(5, 1), &like),
            Some(Value::Date(date_of(2024, 4, 2).unwrap()))
        );
    }
}
