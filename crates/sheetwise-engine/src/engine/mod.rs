//! Query engine API.
//!
//! Everything here is pure and works on already-loaded tables:
//!
//! - [`Value`], [`CellError`] - Typed cells and spreadsheet error codes
//! - [`Table`], [`ColumnId`], [`ParseIssue`] - Read-only datasets
//! - [`CellRef`] - A1 references and range labels
//! - [`Criterion`], [`Predicate`] - Spreadsheet-style criteria
//! - [`aggregate`], [`lookup_exact`], [`lookup_positional`], ... - Queries
//! - [`text`] and [`datetime`] - LEFT/RIGHT/FIND and date/time arithmetic
//! - [`format_value`] - Display formatting

mod cell_ref;
mod criteria;
pub mod datetime;
mod error;
mod format;
mod query;
mod table;
pub mod text;
mod value;

pub use cell_ref::CellRef;
pub use criteria::{Comparison, Criterion, Predicate};
pub use datetime::{TimeCutoff, add_days, compare_time};
pub use error::QueryError;
pub use format::{format_currency, format_number, format_percent, format_plain, format_value};
pub use query::{
    Aggregate, Extremum, PositionalMatch, RowMatch, Selection, aggregate, apply_rate_if,
    count_if, divide, extremum_row, filter_rows, index, lookup_exact, lookup_positional,
    match_position, products, reduce, select_numbers, sum_product,
};
pub use table::{ColumnId, ParseIssue, Table};
pub use value::{CellError, Value, fold_text};
