//! Queries over a [`Table`]: filtering, aggregates, lookups and the small
//! arithmetic helpers the exercises need.
//!
//! Every function is pure. Failures are reported as [`QueryError`] and are
//! local to the query that raised them.

use serde::Serialize;

use super::criteria::{Criterion, Predicate};
use super::error::QueryError;
use super::table::{ColumnId, Table};
use super::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Sum,
    Average,
    Min,
    Max,
    Count,
}

impl Aggregate {
    /// Plain function name (`SUM`, `AVERAGE`, ...).
    pub fn function_name(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Average => "AVERAGE",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
            Aggregate::Count => "COUNT",
        }
    }

    /// Conditional variant for the given number of criteria.
    ///
    /// A single criterion uses the `*IF` form where one exists; MIN and MAX
    /// only ever had the `*IFS` form.
    pub fn conditional_name(self, criteria: usize) -> &'static str {
        let single = criteria <= 1;
        match self {
            Aggregate::Sum if single => "SUMIF",
            Aggregate::Sum => "SUMIFS",
            Aggregate::Average if single => "AVERAGEIF",
            Aggregate::Average => "AVERAGEIFS",
            Aggregate::Count if single => "COUNTIF",
            Aggregate::Count => "COUNTIFS",
            Aggregate::Min => "MINIFS",
            Aggregate::Max => "MAXIFS",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extremum {
    Max,
    Min,
}

/// A row found by a lookup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowMatch {
    /// 0-based data row index.
    pub index: usize,
    /// 1-based row number in the source sheet.
    pub sheet_row: usize,
    pub value: Value,
}

/// Result of a positional (MATCH then INDEX) lookup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionalMatch {
    /// 1-based position inside the searched range.
    pub position: usize,
    /// `position + header_rows`.
    pub sheet_row: usize,
    pub value: Value,
}

/// Rows that passed the predicates together with their numeric values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Selection {
    /// Data row indices, in table order.
    pub rows: Vec<usize>,
    pub values: Vec<f64>,
}

fn check_column(table: &Table, col: ColumnId) -> Result<(), QueryError> {
    if col.0 < table.width() {
        Ok(())
    } else {
        Err(QueryError::UnknownColumn {
            name: format!("#{}", col.0 + 1),
        })
    }
}

/// Indices of the rows satisfying every predicate, in table order.
pub fn filter_rows(table: &Table, predicates: &[Predicate]) -> Result<Vec<usize>, QueryError> {
    for predicate in predicates {
        check_column(table, predicate.column)?;
    }
    Ok((0..table.len())
        .filter(|&i| predicates.iter().all(|p| p.test(table, i)))
        .collect())
}

/// Numeric cells of `col` on the rows that satisfy `predicates`. Text,
/// empty and invalid cells are skipped.
pub fn select_numbers(
    table: &Table,
    col: ColumnId,
    predicates: &[Predicate],
) -> Result<Selection, QueryError> {
    check_column(table, col)?;
    let mut selection = Selection::default();
    for index in filter_rows(table, predicates)? {
        if let Some(n) = table.value(index, col).as_number() {
            selection.rows.push(index);
            selection.values.push(n);
        }
    }
    Ok(selection)
}

/// Fold already-selected numbers. An empty slice is an error for every
/// aggregate, including SUM and COUNT.
pub fn reduce(values: &[f64], aggregate: Aggregate, column: &str) -> Result<f64, QueryError> {
    if values.is_empty() {
        return Err(QueryError::EmptySelection {
            column: column.to_string(),
        });
    }
    let result = match aggregate {
        Aggregate::Sum => values.iter().sum(),
        Aggregate::Average => values.iter().sum::<f64>() / values.len() as f64,
        Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregate::Count => values.len() as f64,
    };
    Ok(result)
}

pub fn aggregate(
    table: &Table,
    col: ColumnId,
    predicates: &[Predicate],
    aggregate: Aggregate,
) -> Result<f64, QueryError> {
    let selection = select_numbers(table, col, predicates)?;
    reduce(&selection.values, aggregate, table.header(col))
}

/// Number of rows satisfying every predicate. Zero is a valid answer.
pub fn count_if(table: &Table, predicates: &[Predicate]) -> Result<usize, QueryError> {
    Ok(filter_rows(table, predicates)?.len())
}

fn not_found(table: &Table, key_col: ColumnId, key: &Value) -> QueryError {
    QueryError::LookupNotFound {
        column: table.header(key_col).to_string(),
        key: super::format::format_value(key),
    }
}

/// First row whose `key_col` equals `key`; returns that row's `result_col`.
pub fn lookup_exact(
    table: &Table,
    key_col: ColumnId,
    key: &Value,
    result_col: ColumnId,
) -> Result<RowMatch, QueryError> {
    check_column(table, key_col)?;
    check_column(table, result_col)?;
    let index = table
        .column_values(key_col)
        .position(|v| v.matches_key(key))
        .ok_or_else(|| not_found(table, key_col, key))?;
    Ok(RowMatch {
        index,
        sheet_row: table.sheet_row(index),
        value: table.value(index, result_col).clone(),
    })
}

/// 1-based position of the first `key` inside `key_col` (MATCH with 0).
pub fn match_position(table: &Table, key_col: ColumnId, key: &Value) -> Result<usize, QueryError> {
    check_column(table, key_col)?;
    table
        .column_values(key_col)
        .position(|v| v.matches_key(key))
        .map(|i| i + 1)
        .ok_or_else(|| not_found(table, key_col, key))
}

/// `INDEX(result_col, MATCH(key, key_col, 0))`.
pub fn lookup_positional(
    table: &Table,
    key_col: ColumnId,
    key: &Value,
    result_col: ColumnId,
) -> Result<PositionalMatch, QueryError> {
    let position = match_position(table, key_col, key)?;
    let found = index(table, result_col, position)?;
    Ok(PositionalMatch {
        position,
        sheet_row: position + table.header_rows,
        value: found.value,
    })
}

/// Value at a 1-based position of a column.
pub fn index(table: &Table, col: ColumnId, position: usize) -> Result<RowMatch, QueryError> {
    check_column(table, col)?;
    if position == 0 || position > table.len() {
        return Err(QueryError::PositionOutOfRange {
            position,
            len: table.len(),
        });
    }
    let index = position - 1;
    Ok(RowMatch {
        index,
        sheet_row: table.sheet_row(index),
        value: table.value(index, col).clone(),
    })
}

/// Row holding the largest (or smallest) number in `col`. Ties go to the
/// earliest row.
pub fn extremum_row(table: &Table, col: ColumnId, which: Extremum) -> Result<RowMatch, QueryError> {
    check_column(table, col)?;
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in table.column_values(col).enumerate() {
        let Some(n) = value.as_number() else {
            continue;
        };
        let better = match (best, which) {
            (None, _) => true,
            (Some((_, b)), Extremum::Max) => n > b,
            (Some((_, b)), Extremum::Min) => n < b,
        };
        if better {
            best = Some((index, n));
        }
    }
    let (index, _) = best.ok_or_else(|| QueryError::EmptySelection {
        column: table.header(col).to_string(),
    })?;
    Ok(RowMatch {
        index,
        sheet_row: table.sheet_row(index),
        value: table.value(index, col).clone(),
    })
}

/// Pairwise products of two columns, skipping rows where either side is not
/// a number. Returns `(row index, product)` pairs.
pub fn products(table: &Table, a: ColumnId, b: ColumnId) -> Result<Vec<(usize, f64)>, QueryError> {
    check_column(table, a)?;
    check_column(table, b)?;
    Ok((0..table.len())
        .filter_map(|i| {
            let x = table.value(i, a).as_number()?;
            let y = table.value(i, b).as_number()?;
            Some((i, x * y))
        })
        .collect())
}

pub fn sum_product(table: &Table, a: ColumnId, b: ColumnId) -> Result<f64, QueryError> {
    let pairs = products(table, a, b)?;
    if pairs.is_empty() {
        return Err(QueryError::EmptySelection {
            column: format!("{} × {}", table.header(a), table.header(b)),
        });
    }
    Ok(pairs.iter().map(|(_, p)| p).sum())
}

pub fn divide(numerator: f64, denominator: f64) -> Result<f64, QueryError> {
    if denominator == 0.0 {
        Err(QueryError::DivisionByZero)
    } else {
        Ok(numerator / denominator)
    }
}

/// `IF(value meets criterion, value * rate, 0)`.
pub fn apply_rate_if(value: f64, criterion: &Criterion, rate: f64) -> f64 {
    if criterion.matches(&Value::Number(value)) {
        value * rate
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> Table {
        Table::from_rows(
            "Sales",
            &["Product", "Units Sold"],
            vec![
                vec![Value::text("P001"), Value::Number(10.0)],
                vec![Value::text("P002"), Value::invalid("ten")],
                vec![Value::text("P001"), Value::Number(20.0)],
                vec![Value::text("P003"), Value::Number(20.0)],
            ],
        )
    }

    #[test]
    fn aggregates_skip_non_numeric_cells() {
        let t = units();
        let col = ColumnId(1);
        assert_eq!(aggregate(&t, col, &[], Aggregate::Sum).unwrap(), 50.0);
        assert_eq!(aggregate(&t, col, &[], Aggregate::Count).unwrap(), 3.0);
        assert_eq!(aggregate(&t, col, &[], Aggregate::Min).unwrap(), 10.0);
    }

    #[test]
    fn empty_selection_is_never_zero() {
        let t = units();
        let nothing = Predicate::new(ColumnId(0), Criterion::eq("P999"));
        let err = aggregate(&t, ColumnId(1), &[nothing.clone()], Aggregate::Sum).unwrap_err();
        assert!(matches!(err, QueryError::EmptySelection { .. }));
        assert_eq!(count_if(&t, &[nothing]).unwrap(), 0);
    }

    #[test]
    fn extremum_prefers_first_occurrence() {
        let t = units();
        let top = extremum_row(&t, ColumnId(1), Extremum::Max).unwrap();
        assert_eq!(top.index, 2);
        assert_eq!(top.sheet_row, 4);
    }

    #[test]
    fn index_is_one_based() {
        let t = units();
        assert_eq!(index(&t, ColumnId(0), 1).unwrap().value, Value::text("P001"));
        assert_eq!(
            index(&t, ColumnId(0), 0).unwrap_err(),
            QueryError::PositionOutOfRange { position: 0, len: 4 }
        );
        assert!(index(&t, ColumnId(0), 5).is_err());
    }

    #[test]
    fn lookups_ignore_case_and_padding() {
        let t = units();
        let hit = lookup_exact(&t, ColumnId(0), &Value::text(" p003 "), ColumnId(1)).unwrap();
        assert_eq!(hit.value, Value::Number(20.0));
        let pos = lookup_positional(&t, ColumnId(0), &Value::text("P002"), ColumnId(1)).unwrap();
        assert_eq!(pos.position, 2);
        assert_eq!(pos.sheet_row, 3);
        assert!(pos.value.is_invalid());
    }

    #[test]
    fn out_of_range_column_is_rejected() {
        let t = units();
        assert!(matches!(
            aggregate(&t, ColumnId(7), &[], Aggregate::Sum),
            Err(QueryError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn conditional_names() {
        assert_eq!(Aggregate::Sum.conditional_name(1), "SUMIF");
        assert_eq!(Aggregate::Sum.conditional_name(2), "SUMIFS");
        assert_eq!(Aggregate::Max.conditional_name(1), "MAXIFS");
        assert_eq!(Aggregate::Count.conditional_name(2), "COUNTIFS");
    }

    #[test]
    fn rate_applies_only_when_criterion_holds() {
        let c = Criterion::ge(100.0);
        assert_eq!(apply_rate_if(150.0, &c, 0.1), 15.0);
        assert_eq!(apply_rate_if(100.0, &c, 0.1), 10.0);
        assert_eq!(apply_rate_if(99.0, &c, 0.1), 0.0);
    }
}
