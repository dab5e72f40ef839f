//! File formats: CSV and workbook import, markdown export.

mod csv;
mod md;
mod sheet;
mod xlsx;

use std::path::Path;

use crate::error::{Result, SheetwiseError};

pub use csv::{parse_csv_content, read_csv};
pub use md::{render_markdown, write_markdown};
pub use sheet::{RawCell, RawSheet};
pub use xlsx::read_workbook;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read the first sheet of a CSV file or workbook, picking the reader by
/// extension.
pub fn read_sheet(path: &Path) -> Result<RawSheet> {
    if !path.is_file() {
        return Err(SheetwiseError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => read_csv(path),
        e if WORKBOOK_EXTENSIONS.contains(&e) => read_workbook(path),
        _ => Err(SheetwiseError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
