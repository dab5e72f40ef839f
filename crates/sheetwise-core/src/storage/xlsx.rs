//! Workbook import (xlsx, xlsm, xlsb, xls, ods) through calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use sheetwise_engine::engine::CellRef;

use super::sheet::{RawCell, RawSheet};
use crate::error::Result;

/// Read the first worksheet of a workbook, cached values and formulas.
pub fn read_workbook(path: &Path) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheet = RawSheet::new(path);

    let Some(name) = workbook.sheet_names().first().cloned() else {
        tracing::warn!(path = %path.display(), "workbook has no sheets");
        return Ok(sheet);
    };

    let range = workbook.worksheet_range(&name)?;
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    for (row, col, data) in range.used_cells() {
        let cell = raw_cell(data);
        if cell == RawCell::Empty {
            continue;
        }
        sheet.set(row_offset as usize + row, col_offset as usize + col, cell);
    }

    // Formula ranges are absent for some formats; treat them as optional.
    match workbook.worksheet_formula(&name) {
        Ok(formulas) => {
            let (row_offset, col_offset) = formulas.start().unwrap_or((0, 0));
            for (row, col, formula) in formulas.used_cells() {
                let cell = CellRef::new(col_offset as usize + col, row_offset as usize + row);
                sheet.set_formula(cell, formula);
            }
        }
        Err(e) => tracing::debug!(path = %path.display(), error = %e, "no formula data"),
    }

    Ok(sheet)
}

fn raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) => RawCell::Serial(dt.as_f64()),
        Data::Error(e) => RawCell::Error(e.to_string()),
        other => RawCell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_cell_conversion() {
        assert_eq!(raw_cell(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(raw_cell(&Data::String("P001".into())), RawCell::Text("P001".into()));
        assert_eq!(
            raw_cell(&Data::Error(calamine::CellErrorType::Div0)),
            RawCell::Error("#DIV/0!".into())
        );
    }

    #[test]
    fn test_missing_workbook_is_an_error() {
        let path = std::env::temp_dir().join("sheetwise_no_such_workbook.xlsx");
        assert!(read_workbook(&path).is_err());
    }
}
