//! Row predicates in the shape of spreadsheet criteria (`"IT"`, `">5"`,
//! `">=0.05"`, `"<12:00"`).

use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use super::datetime::{parse_date, parse_time};
use super::error::QueryError;
use super::format::{format_plain, format_value};
use super::table::{ColumnId, Table};
use super::value::{Value, fold_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
        }
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            Comparison::Eq => ord == Ordering::Equal,
            Comparison::Ne => ord != Ordering::Equal,
            Comparison::Gt => ord == Ordering::Greater,
            Comparison::Ge => ord != Ordering::Less,
            Comparison::Lt => ord == Ordering::Less,
            Comparison::Le => ord != Ordering::Greater,
        }
    }
}

/// Longest operators first so `>=` is not read as `>` followed by `=`.
const OPERATORS: &[(&str, Comparison)] = &[
    (">=", Comparison::Ge),
    ("<=", Comparison::Le),
    ("<>", Comparison::Ne),
    (">", Comparison::Gt),
    ("<", Comparison::Lt),
    ("=", Comparison::Eq),
];

/// A comparison against a fixed operand.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Criterion {
    pub op: Comparison,
    pub operand: Value,
}

impl Criterion {
    pub fn new(op: Comparison, operand: impl Into<Value>) -> Criterion {
        Criterion {
            op,
            operand: operand.into(),
        }
    }

    pub fn eq(operand: impl Into<Value>) -> Criterion {
        Self::new(Comparison::Eq, operand)
    }

    pub fn gt(operand: impl Into<Value>) -> Criterion {
        Self::new(Comparison::Gt, operand)
    }

    pub fn ge(operand: impl Into<Value>) -> Criterion {
        Self::new(Comparison::Ge, operand)
    }

    pub fn lt(operand: impl Into<Value>) -> Criterion {
        Self::new(Comparison::Lt, operand)
    }

    /// Parse a spreadsheet criteria string.
    pub fn parse(input: &str) -> Result<Criterion, QueryError> {
        let trimmed = input.trim();
        let (op, rest) = OPERATORS
            .iter()
            .find_map(|(sym, op)| trimmed.strip_prefix(sym).map(|rest| (*op, rest)))
            .unwrap_or((Comparison::Eq, trimmed));
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(QueryError::InvalidCriterion {
                criterion: input.to_string(),
            });
        }
        Ok(Criterion::new(op, parse_operand(rest)))
    }

    pub fn matches(&self, value: &Value) -> bool {
        match compare(value, &self.operand) {
            Some(ord) => self.op.holds(ord),
            // Values of another type are "not equal" and nothing else.
            None => self.op == Comparison::Ne,
        }
    }

    /// Criteria text as it appears inside a formula, quotes included.
    /// Dates and times are concatenated onto the operator
    /// (`">="&DATE(2024,3,15)`).
    pub fn formula_text(&self) -> String {
        let operand = match &self.operand {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_plain(*n),
            Value::Date(d) => {
                return format!(
                    "\"{}\"&DATE({},{},{})",
                    self.op.symbol(),
                    d.year(),
                    d.month(),
                    d.day()
                );
            }
            Value::Time(t) => {
                return format!(
                    "\"{}\"&TIME({},{},{})",
                    self.op.symbol(),
                    t.hour(),
                    t.minute(),
                    t.second()
                );
            }
            other => format_value(other),
        };
        match self.op {
            Comparison::Eq => format!("\"{}\"", operand),
            op => format!("\"{}{}\"", op.symbol(), operand),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operand {
            Value::Text(s) => write!(f, "{} \"{}\"", self.op.symbol(), s),
            other => write!(f, "{} {}", self.op.symbol(), format_value(other)),
        }
    }
}

fn parse_operand(text: &str) -> Value {
    if let Some(n) = text.parse::<f64>().ok().filter(|n| n.is_finite()) {
        return Value::Number(n);
    }
    if let Some(n) = text.strip_suffix('%').and_then(|p| p.trim().parse::<f64>().ok()) {
        return Value::Number(n / 100.0);
    }
    if let Some(t) = parse_time(text) {
        return Value::Time(t);
    }
    if let Some(d) = parse_date(text) {
        return Value::Date(d);
    }
    match text.to_ascii_uppercase().as_str() {
        "TRUE" => Value::Bool(true),
        "FALSE" => Value::Bool(false),
        _ => Value::text(text),
    }
}

fn compare(value: &Value, operand: &Value) -> Option<Ordering> {
    match (value, operand) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(fold_text(a).cmp(&fold_text(b))),
        _ => None,
    }
}

/// A criterion bound to a column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Predicate {
    pub column: ColumnId,
    pub criterion: Criterion,
}

impl Predicate {
    pub fn new(column: ColumnId, criterion: Criterion) -> Predicate {
        Predicate { column, criterion }
    }

    pub fn test(&self, table: &Table, index: usize) -> bool {
        self.criterion.matches(table.value(index, self.column))
    }

    /// Human-readable form, e.g. `Department = "IT"`.
    pub fn describe(&self, table: &Table) -> String {
        format!("{} {}", table.header(self.column), self.criterion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::datetime::time_of;

    #[test]
    fn parses_operators_and_operand_types() {
        assert_eq!(Criterion::parse(">=5").unwrap(), Criterion::ge(5.0));
        assert_eq!(Criterion::parse("IT").unwrap(), Criterion::eq("IT"));
        assert_eq!(Criterion::parse(">5%").unwrap(), Criterion::gt(0.05));
        assert_eq!(
            Criterion::parse("<12:00").unwrap(),
            Criterion::lt(time_of(12, 0, 0).unwrap())
        );
        assert!(matches!(
            Criterion::parse(">=").unwrap_err(),
            QueryError::InvalidCriterion { .. }
        ));
    }

    #[test]
    fn strict_and_inclusive_differ_only_at_the_boundary() {
        let five = Value::Number(5.0);
        assert!(!Criterion::gt(5.0).matches(&five));
        assert!(Criterion::ge(5.0).matches(&five));
        assert!(Criterion::gt(5.0).matches(&Value::Number(5.01)));
    }

    #[test]
    fn type_mismatch_only_satisfies_not_equal() {
        let text = Value::text("n/a");
        assert!(!Criterion::gt(1.0).matches(&text));
        assert!(!Criterion::eq(1.0).matches(&text));
        assert!(Criterion::parse("<>1").unwrap().matches(&text));
    }

    #[test]
    fn text_criteria_and_lookup_keys_fold_case_alike() {
        let cell = Value::text("NÚÑEZ");
        let key = Value::text("núñez");
        assert!(Criterion::eq("núñez").matches(&cell));
        assert_eq!(Criterion::eq("núñez").matches(&cell), cell.matches_key(&key));
    }

    #[test]
    fn formula_text_quotes_the_whole_criterion() {
        assert_eq!(Criterion::eq("P002").formula_text(), "\"P002\"");
        assert_eq!(Criterion::gt(15.0).formula_text(), "\">15\"");
        assert_eq!(Criterion::parse(">=0.05").unwrap().formula_text(), "\">=0.05\"");
    }

    #[test]
    fn formula_text_builds_dates_and_times() {
        let on_or_after = Criterion::parse(">=2024-03-15").unwrap();
        assert_eq!(on_or_after.formula_text(), "\">=\"&DATE(2024,3,15)");
        assert_eq!(
            Criterion::lt(time_of(12, 0, 0).unwrap()).formula_text(),
            "\"<\"&TIME(12,0,0)"
        );
    }
}
