//! The four fixed datasets and the loader that turns raw sheets into typed
//! tables.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sheetwise_engine::engine::datetime::{
    date_from_serial, parse_date, parse_time, time_from_serial,
};
use sheetwise_engine::engine::{CellError, ParseIssue, Table, Value};

use crate::error::{Result, SheetwiseError};
use crate::storage::{RawCell, RawSheet, read_sheet};

/// One of the shipped datasets.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Sales,
    Employees,
    Bonus,
    Orders,
}

impl Group {
    pub const ALL: [Group; 4] = [Group::Sales, Group::Employees, Group::Bonus, Group::Orders];

    pub fn slug(self) -> &'static str {
        match self {
            Group::Sales => "sales",
            Group::Employees => "employees",
            Group::Bonus => "bonus",
            Group::Orders => "orders",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Group::Sales => "Sales",
            Group::Employees => "Employees",
            Group::Bonus => "Employee Bonus",
            Group::Orders => "Orders",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Group::Sales => &SALES,
            Group::Employees => &EMPLOYEES,
            Group::Bonus => &BONUS,
            Group::Orders => &ORDERS,
        }
    }

    /// File stem used for the default data directory layout.
    pub fn file_stem(self) -> &'static str {
        match self {
            Group::Bonus => "employee_bonus",
            other => other.slug(),
        }
    }

    pub fn raw_file_name(self) -> String {
        format!("{}.csv", self.file_stem())
    }

    pub fn resolved_file_name(self) -> String {
        format!("{}_resolved.csv", self.file_stem())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Group {
    type Err = SheetwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(Group::Sales),
            "employees" | "employee" => Ok(Group::Employees),
            "bonus" | "employee-bonus" | "employee_bonus" => Ok(Group::Bonus),
            "orders" => Ok(Group::Orders),
            other => Err(SheetwiseError::Config(format!("unknown dataset group: {other}"))),
        }
    }
}

/// How a column's raw text is converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Whole number, zero or more.
    Integer,
    /// Money; symbols and thousands separators are stripped.
    Currency,
    /// Fraction in `[0, 1]`, written either `0.05` or `5%`.
    Fraction,
    Date,
    Time,
}

impl ColumnKind {
    pub fn describe(self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "whole number",
            ColumnKind::Currency => "currency amount",
            ColumnKind::Fraction => "fraction between 0 and 1",
            ColumnKind::Date => "date",
            ColumnKind::Time => "time of day",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

/// Fixed column layout of a dataset, in file order.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl Schema {
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }
}

pub static SALES: Schema = Schema {
    name: "Sales",
    columns: &[
        col("Date", ColumnKind::Date),
        col("Product", ColumnKind::Text),
        col("Units Sold", ColumnKind::Integer),
        col("Price per Unit", ColumnKind::Currency),
    ],
};

pub static EMPLOYEES: Schema = Schema {
    name: "Employees",
    columns: &[
        col("Employee ID", ColumnKind::Text),
        col("Name", ColumnKind::Text),
        col("Department", ColumnKind::Text),
        col("Salary", ColumnKind::Currency),
    ],
};

pub static BONUS: Schema = Schema {
    name: "Employee Bonus",
    columns: &[
        col("Employee ID", ColumnKind::Text),
        col("Name", ColumnKind::Text),
        col("Department", ColumnKind::Text),
        col("Salary", ColumnKind::Currency),
        col("Years of Service", ColumnKind::Integer),
        col("Bonus %", ColumnKind::Fraction),
    ],
};

pub static ORDERS: Schema = Schema {
    name: "Orders",
    columns: &[
        col("Order ID", ColumnKind::Integer),
        col("Customer Name", ColumnKind::Text),
        col("Order Date", ColumnKind::Date),
        col("Order Time", ColumnKind::Time),
        col("Order Amount", ColumnKind::Currency),
    ],
};

/// Load a dataset file and convert it with the group's schema.
pub fn load_table(group: Group, path: &Path) -> Result<Table> {
    let sheet = read_sheet(path)?;
    table_from_sheet(group.schema(), &sheet)
}

/// Apply a schema to a raw sheet. Row 1 is the header row.
///
/// Cells that fail conversion become [`Value::Invalid`] and are listed in
/// [`Table::issues`]; they never turn into zero.
pub fn table_from_sheet(schema: &Schema, sheet: &RawSheet) -> Result<Table> {
    let header = sheet.rows.first().map(Vec::as_slice).unwrap_or(&[]);
    let found = header.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
    let expected = schema.columns.len();
    if found < expected {
        return Err(SheetwiseError::Schema {
            path: sheet.path.clone(),
            expected,
            found,
        });
    }
    for (spec, cell) in schema.columns.iter().zip(header) {
        let text = cell.to_text();
        if !text.trim().eq_ignore_ascii_case(spec.name) {
            tracing::debug!(expected = spec.name, found = %text, "header differs from schema");
        }
    }

    let mut table = Table::new(schema.name, schema.headers());
    let data_rows = sheet.rows.get(1..).unwrap_or(&[]);
    let width = data_rows
        .iter()
        .rposition(|row| row.iter().take(expected).any(|c| !c.is_empty()))
        .map_or(0, |i| i + 1);

    for (i, row) in data_rows.iter().take(width).enumerate() {
        let sheet_row = i + 2;
        let mut values = Vec::with_capacity(expected);
        for (c, spec) in schema.columns.iter().enumerate() {
            let raw = row.get(c).unwrap_or(&RawCell::Empty);
            let value = convert(raw, spec.kind);
            if value.is_invalid() {
                let raw_text = raw.to_text();
                tracing::warn!(
                    path = %sheet.path.display(),
                    row = sheet_row,
                    column = spec.name,
                    raw = %raw_text,
                    "cannot read {}",
                    spec.kind.describe()
                );
                table.issues.push(ParseIssue {
                    sheet_row,
                    column: spec.name.to_string(),
                    raw: raw_text,
                    expected: spec.kind.describe().to_string(),
                });
            }
            values.push(value);
        }
        table.push_row(values);
    }

    Ok(table)
}

/// Convert one raw cell by column kind.
pub fn convert(raw: &RawCell, kind: ColumnKind) -> Value {
    let converted = match raw {
        RawCell::Empty => return Value::Empty,
        RawCell::Text(s) if s.trim().is_empty() => return Value::Empty,
        RawCell::Error(code) => {
            return CellError::from_code(code)
                .map(Value::Error)
                .unwrap_or_else(|| Value::invalid(code.clone()));
        }
        RawCell::Text(s) => convert_text(s.trim(), kind),
        RawCell::Number(n) | RawCell::Serial(n) => convert_number(*n, kind),
        RawCell::Bool(_) => match kind {
            ColumnKind::Text => Some(Value::text(raw.to_text())),
            _ => None,
        },
    };
    converted.unwrap_or_else(|| Value::invalid(raw.to_text()))
}

fn convert_text(s: &str, kind: ColumnKind) -> Option<Value> {
    match kind {
        ColumnKind::Text => Some(Value::text(s)),
        ColumnKind::Integer => parse_grouped(s).and_then(whole),
        ColumnKind::Currency => parse_currency(s).map(Value::Number),
        ColumnKind::Fraction => parse_fraction(s).map(Value::Number),
        ColumnKind::Date => parse_date(s).map(Value::Date),
        ColumnKind::Time => parse_time(s).map(Value::Time),
    }
}

fn convert_number(n: f64, kind: ColumnKind) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    match kind {
        ColumnKind::Text => Some(Value::text(n.to_string())),
        ColumnKind::Integer => whole(n),
        ColumnKind::Currency => Some(Value::Number(n)),
        ColumnKind::Fraction => (0.0..=1.0).contains(&n).then_some(Value::Number(n)),
        ColumnKind::Date => date_from_serial(n).map(Value::Date),
        ColumnKind::Time => time_from_serial(n).map(Value::Time),
    }
}

fn whole(n: f64) -> Option<Value> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0).then_some(Value::Number(n))
}

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

fn grouped_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?$")
            .expect("grouped number regex must compile")
    })
}

/// Parse `1234`, `1,234` or `1,234.50`. Commas must group thousands.
pub fn parse_grouped(s: &str) -> Option<f64> {
    if !grouped_number_re().is_match(s) {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a money string: `$1,234.50`, `€ 99`, `99 €`, `-$5`, `(45.00)`.
///
/// The symbol may only lead or trail the number; anything else inside the
/// cell makes it unreadable.
pub fn parse_currency(s: &str) -> Option<f64> {
    let s = s.trim();
    let (parens, s) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };
    let (minus_outside, s) = strip_minus(s);
    let s = match s.strip_prefix(CURRENCY_SYMBOLS) {
        Some(rest) => rest.trim_start(),
        None => s.strip_suffix(CURRENCY_SYMBOLS).map_or(s, str::trim_end),
    };
    let (minus_inside, s) = strip_minus(s);
    let signs = [parens, minus_outside, minus_inside].iter().filter(|b| **b).count();
    if signs > 1 {
        return None;
    }
    let n = parse_grouped(s)?;
    Some(if signs == 1 { -n } else { n })
}

fn strip_minus(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

/// Parse a fraction written as `0.05` or `5%`; values outside `[0, 1]` are
/// rejected.
pub fn parse_fraction(s: &str) -> Option<f64> {
    let s = s.trim();
    let n = match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
        None => s.parse::<f64>().ok()?,
    };
    (n.is_finite() && (0.0..=1.0).contains(&n)).then_some(n)
}
