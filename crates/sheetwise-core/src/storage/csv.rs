//! CSV import.

use std::path::Path;

use sheetwise_engine::engine::{CellError, CellRef};

use super::sheet::{RawCell, RawSheet};
use crate::error::Result;

/// Read a CSV file. Cells starting with `=` are treated as formula text and
/// carry no cached value.
pub fn read_csv(path: &Path) -> Result<RawSheet> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_csv_content(path, &content))
}

pub fn parse_csv_content(path: &Path, content: &str) -> RawSheet {
    let mut sheet = RawSheet::new(path);
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    for (row_idx, line) in content.lines().enumerate() {
        for (col_idx, field) in parse_csv_line(line).into_iter().enumerate() {
            if field.is_empty() {
                continue;
            }
            if field.trim_start().starts_with('=') {
                sheet.set_formula(CellRef::new(col_idx, row_idx), &field);
                continue;
            }
            sheet.set(row_idx, col_idx, parse_csv_field(&field));
        }
        if sheet.rows.len() <= row_idx {
            sheet.rows.resize_with(row_idx + 1, Vec::new);
        }
    }

    sheet
}

/// Parse a single CSV line, handling quoted fields
pub(crate) fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c != '"' {
                current.push(c);
            } else if chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                fields.push(finish_field(std::mem::take(&mut current), quoted));
                quoted = false;
            }
            _ => current.push(c),
        }
    }
    fields.push(finish_field(current, quoted));
    fields
}

fn finish_field(field: String, quoted: bool) -> String {
    if quoted { field } else { field.trim().to_string() }
}

/// Parse a CSV field into a raw cell
/// - Numbers with leading zeros (`007`) stay text
/// - `TRUE`/`FALSE` become booleans
/// - Spreadsheet error literals are kept as errors
/// - Everything else is text; typed conversion happens in the loader
pub(crate) fn parse_csv_field(field: &str) -> RawCell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return RawCell::Empty;
    }
    if field != trimmed {
        return RawCell::Text(field.to_string());
    }

    if trimmed.starts_with('0')
        && trimmed.len() > 1
        && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
    {
        return RawCell::Text(trimmed.to_string());
    }

    if let Some(n) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) {
        return RawCell::Number(n);
    }

    if CellError::from_code(trimmed).is_some() {
        return RawCell::Error(trimmed.to_string());
    }

    match trimmed.to_ascii_uppercase().as_str() {
        "TRUE" => RawCell::Bool(true),
        "FALSE" => RawCell::Bool(false),
        _ => RawCell::Text(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_line_quoted() {
        assert_eq!(
            parse_csv_line(r#"E001,"Alice Johnson",Sales,"$55,000""#),
            vec!["E001", "Alice Johnson", "Sales", "$55,000"]
        );
    }

    #[test]
    fn test_parse_csv_line_escaped_quotes() {
        assert_eq!(
            parse_csv_line(r#"a,"=COUNTIF(B2:B11,""P002"")",c"#),
            vec!["a", r#"=COUNTIF(B2:B11,"P002")"#, "c"]
        );
    }

    #[test]
    fn test_parse_csv_line_trailing_empty_field() {
        assert_eq!(parse_csv_line("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_parse_csv_field_kinds() {
        assert_eq!(parse_csv_field("42"), RawCell::Number(42.0));
        assert_eq!(parse_csv_field("007"), RawCell::Text("007".into()));
        assert_eq!(parse_csv_field("0.05"), RawCell::Number(0.05));
        assert_eq!(parse_csv_field("true"), RawCell::Bool(true));
        assert_eq!(parse_csv_field("#N/A"), RawCell::Error("#N/A".into()));
        assert_eq!(parse_csv_field("$25.00"), RawCell::Text("$25.00".into()));
        assert_eq!(parse_csv_field("NaN"), RawCell::Text("NaN".into()));
    }

    #[test]
    fn test_formula_cells_go_to_formula_map() {
        let content = "\u{feff}Label,Result\nTotal,\"=SUM(C2:C11)\"\n";
        let sheet = parse_csv_content(Path::new("mem.csv"), content);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.cell(&CellRef::new(0, 0)), &RawCell::Text("Label".into()));
        assert_eq!(sheet.cell(&CellRef::new(1, 1)), &RawCell::Empty);
        assert_eq!(
            sheet.formulas.get(&CellRef::new(1, 1)).map(String::as_str),
            Some("=SUM(C2:C11)")
        );
    }
}
