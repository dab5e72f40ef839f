//! Column-named, read-only tables.

use serde::Serialize;

use super::cell_ref::CellRef;
use super::error::QueryError;
use super::value::Value;

static EMPTY: Value = Value::Empty;

/// Position of a column inside a [`Table`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ColumnId(pub usize);

/// A cell whose text could not be converted to its column's type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParseIssue {
    pub sheet_row: usize,
    pub column: String,
    pub raw: String,
    pub expected: String,
}

/// A loaded dataset: one header row, then data rows in file order.
///
/// Row order is significant (positional lookups depend on it) and tables are
/// never mutated once the loader hands them out.
#[derive(Clone, Debug, Serialize)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows above the data in the source sheet.
    pub header_rows: usize,
    pub issues: Vec<ParseIssue>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Table {
        Table {
            name: name.into(),
            headers,
            rows: Vec::new(),
            header_rows: 1,
            issues: Vec::new(),
        }
    }

    /// Build a table from string headers and rows (handy for tests and demos).
    pub fn from_rows(name: &str, headers: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut table = Table::new(name, headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Append a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.headers.len(), Value::Empty);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Resolve a header name (case-insensitive, trimmed).
    pub fn column(&self, name: &str) -> Result<ColumnId, QueryError> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
            .map(ColumnId)
            .ok_or_else(|| QueryError::UnknownColumn {
                name: name.to_string(),
            })
    }

    pub fn header(&self, col: ColumnId) -> &str {
        self.headers.get(col.0).map(String::as_str).unwrap_or("")
    }

    pub fn value(&self, index: usize, col: ColumnId) -> &Value {
        self.rows
            .get(index)
            .and_then(|row| row.get(col.0))
            .unwrap_or(&EMPTY)
    }

    pub fn column_values(&self, col: ColumnId) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| row.get(col.0).unwrap_or(&EMPTY))
    }

    /// 1-based spreadsheet row number of a data row (data row 0 is row 2
    /// when there is a single header row).
    pub fn sheet_row(&self, index: usize) -> usize {
        index + self.header_rows + 1
    }

    pub fn first_data_row(&self) -> usize {
        self.header_rows + 1
    }

    /// Last data row's sheet number; equals the header row when empty.
    pub fn last_data_row(&self) -> usize {
        self.header_rows + self.rows.len()
    }

    pub fn cell_ref(&self, index: usize, col: ColumnId) -> CellRef {
        CellRef::new(col.0, self.sheet_row(index) - 1)
    }

    pub fn column_letter(&self, col: ColumnId) -> String {
        CellRef::col_to_letters(col.0)
    }

    /// Data range of a column, e.g. `C2:C11`.
    pub fn range_label(&self, col: ColumnId) -> String {
        CellRef::column_range(col.0, self.first_data_row(), self.last_data_row())
    }

    /// Rectangular data range spanning two columns, e.g. `B2:D11`.
    pub fn block_label(&self, first: ColumnId, last: ColumnId) -> String {
        format!(
            "{}{}:{}{}",
            self.column_letter(first),
            self.first_data_row(),
            self.column_letter(last),
            self.last_data_row()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            "Sales",
            &["Date", "Product", "Units Sold"],
            vec![
                vec![Value::Empty, Value::text("P001"), Value::Number(10.0)],
                vec![Value::Empty, Value::text("P002")],
            ],
        )
    }

    #[test]
    fn rows_are_padded_to_header_width() {
        let t = sample();
        assert_eq!(t.rows[1].len(), 3);
        assert_eq!(t.value(1, ColumnId(2)), &Value::Empty);
        assert_eq!(t.value(99, ColumnId(0)), &Value::Empty);
    }

    #[test]
    fn labels_follow_sheet_numbering() {
        let t = sample();
        let units = t.column("units sold").unwrap();
        assert_eq!(t.sheet_row(0), 2);
        assert_eq!(t.range_label(units), "C2:C3");
        assert_eq!(t.block_label(ColumnId(1), units), "B2:C3");
        assert_eq!(t.cell_ref(1, units).to_string(), "C3");
    }

    #[test]
    fn unknown_column_is_an_error() {
        assert_eq!(
            sample().column("Revenue"),
            Err(QueryError::UnknownColumn {
                name: "Revenue".to_string()
            })
        );
    }
}
