//! Formula exercises.
//!
//! Each exercise replays one classroom formula against a loaded table and
//! records what a student would write down: the formula, the derivation step
//! by step, the answer, and how the instructor's resolved sheet compares.
//! The records are plain data so any renderer (terminal, HTML, markdown,
//! JSON) can display them.

mod bonus;
mod employees;
mod orders;
mod sales;

use serde::Serialize;
use sheetwise_engine::engine::{
    Aggregate, CellError, CellRef, ColumnId, Extremum, Predicate, QueryError, Table, Value,
    extremum_row, filter_rows, format_currency, format_number, format_percent, format_value, index,
    reduce, select_numbers,
};

use crate::dataset::Group;
use crate::resolved::{ResolvedSheet, normalize_formula};

pub use bonus::SALARY_BAND_THRESHOLD;
pub use employees::{LookupFlavour, LookupSpec};

/// Build every exercise of a group.
pub fn exercises_for(
    group: Group,
    table: &Table,
    resolved: Option<&ResolvedSheet>,
) -> Result<Vec<Exercise>, QueryError> {
    match group {
        Group::Sales => sales::exercises(table, resolved),
        Group::Employees => employees::exercises(table, resolved),
        Group::Bonus => bonus::exercises(table, resolved),
        Group::Orders => orders::exercises(table, resolved),
    }
}

/// How numbers are written in steps and answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberStyle {
    #[default]
    Plain,
    Currency,
    Percent,
}

impl NumberStyle {
    pub fn render(self, n: f64) -> String {
        match self {
            NumberStyle::Plain => format_number(n),
            NumberStyle::Currency => format_currency(n),
            NumberStyle::Percent => format_percent(n),
        }
    }

    pub fn render_value(self, value: &Value) -> String {
        match value {
            Value::Number(n) => self.render(*n),
            other => format_value(other),
        }
    }
}

/// A small table shown inside a step.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DisplayTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn new(headers: Vec<String>) -> DisplayTable {
        DisplayTable {
            headers,
            rows: Vec::new(),
        }
    }

    /// The given data rows, each prefixed with its sheet row number.
    pub fn from_rows(
        table: &Table,
        rows: &[usize],
        columns: &[(ColumnId, NumberStyle)],
    ) -> DisplayTable {
        let mut headers = vec!["Row".to_string()];
        headers.extend(columns.iter().map(|(c, _)| table.header(*c).to_string()));
        let mut out = DisplayTable::new(headers);
        for &i in rows {
            let mut cells = vec![table.sheet_row(i).to_string()];
            cells.extend(
                columns
                    .iter()
                    .map(|(c, style)| style.render_value(table.value(i, *c))),
            );
            out.rows.push(cells);
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Detail {
    Table(DisplayTable),
    Pairs(Vec<(String, String)>),
}

/// One line of a derivation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Step {
    pub text: String,
    pub detail: Option<Detail>,
    /// Something the reader should notice (skipped cell, row-level error).
    pub flagged: bool,
}

/// One row of a filled-down answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnEntry {
    pub sheet_row: usize,
    pub label: String,
    pub value: Value,
    pub display: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    Scalar { value: Value, display: String },
    Column { header: String, rows: Vec<ColumnEntry> },
}

impl Answer {
    pub fn scalar(value: Value, style: NumberStyle) -> Answer {
        let display = style.render_value(&value);
        Answer::Scalar { value, display }
    }

    /// Value of the exercise's own cell (the first row of a column answer).
    pub fn first_value(&self) -> Option<&Value> {
        match self {
            Answer::Scalar { value, .. } => Some(value),
            Answer::Column { rows, .. } => rows.first().map(|r| &r.value),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Answer::Scalar { display, .. } => display.clone(),
            Answer::Column { header, rows } => {
                let errors = rows.iter().filter(|r| r.value.is_error()).count();
                if errors == 0 {
                    format!("{} rows of {}", rows.len(), header)
                } else {
                    format!("{} rows of {} ({} flagged)", rows.len(), header, errors)
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CheckStatus {
    Match,
    FormulaDiffers,
    ValueDiffers,
    Unavailable(String),
}

impl CheckStatus {
    pub fn label(&self) -> &str {
        match self {
            CheckStatus::Match => "match",
            CheckStatus::FormulaDiffers => "formula differs",
            CheckStatus::ValueDiffers => "value differs",
            CheckStatus::Unavailable(_) => "unavailable",
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, CheckStatus::FormulaDiffers | CheckStatus::ValueDiffers)
    }
}

/// Comparison with the resolved sheet at the exercise's cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrossCheck {
    pub cell: CellRef,
    pub official_formula: String,
    pub official_value: Option<Value>,
    pub status: CheckStatus,
}

impl CrossCheck {
    pub fn run(
        resolved: Option<&ResolvedSheet>,
        cell: CellRef,
        formula: &str,
        computed: &Value,
    ) -> CrossCheck {
        let Some(resolved) = resolved else {
            return CrossCheck {
                cell,
                official_formula: String::new(),
                official_value: None,
                status: CheckStatus::Unavailable("resolved file not loaded".to_string()),
            };
        };
        let official_formula = resolved.formula(&cell);
        let official_value = resolved.cached_value(&cell, computed);
        let status = if official_formula.is_empty() {
            CheckStatus::Unavailable(format!("no formula stored at {cell}"))
        } else if normalize_formula(&official_formula) != normalize_formula(formula) {
            CheckStatus::FormulaDiffers
        } else if official_value.as_ref().is_some_and(|v| !v.approx_eq(computed)) {
            CheckStatus::ValueDiffers
        } else {
            CheckStatus::Match
        };
        CrossCheck {
            cell,
            official_formula,
            official_value,
            status,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Exercise {
    pub id: &'static str,
    pub title: String,
    pub task: String,
    pub formula: String,
    pub cell: CellRef,
    pub steps: Vec<Step>,
    pub answer: Result<Answer, QueryError>,
    pub cross_check: CrossCheck,
}

impl Exercise {
    pub fn is_ok(&self) -> bool {
        self.answer.is_ok()
    }

    /// Short answer line: the value, or the error the sheet would show.
    pub fn answer_text(&self) -> String {
        match &self.answer {
            Ok(answer) => answer.summary(),
            Err(e) => format!("{} ({})", e.cell_error(), e),
        }
    }
}

/// Collects steps while an exercise is derived.
#[derive(Debug)]
pub struct ExerciseBuilder {
    id: &'static str,
    title: String,
    task: String,
    formula: String,
    cell: CellRef,
    steps: Vec<Step>,
}

impl ExerciseBuilder {
    pub fn new(id: &'static str, title: impl Into<String>, cell: CellRef) -> ExerciseBuilder {
        ExerciseBuilder {
            id,
            title: title.into(),
            task: String::new(),
            formula: String::new(),
            cell,
            steps: Vec::new(),
        }
    }

    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = formula.into();
        self
    }

    pub fn step(&mut self, text: impl Into<String>) {
        self.push(text.into(), None, false);
    }

    pub fn detail(&mut self, text: impl Into<String>, detail: Detail) {
        self.push(text.into(), Some(detail), false);
    }

    pub fn flag(&mut self, text: impl Into<String>) {
        self.push(text.into(), None, true);
    }

    fn push(&mut self, text: String, detail: Option<Detail>, flagged: bool) {
        self.steps.push(Step {
            text,
            detail,
            flagged,
        });
    }

    pub fn finish(
        mut self,
        answer: Result<Answer, QueryError>,
        resolved: Option<&ResolvedSheet>,
    ) -> Exercise {
        let computed = match &answer {
            Ok(a) => a.first_value().cloned().unwrap_or(Value::Empty),
            Err(e) => {
                self.flag(format!("Stopped: {e}. The sheet shows {}.", e.cell_error()));
                Value::Error(e.cell_error())
            }
        };
        let cross_check = CrossCheck::run(resolved, self.cell, &self.formula, &computed);
        tracing::debug!(
            id = self.id,
            ok = answer.is_ok(),
            check = cross_check.status.label(),
            "exercise computed"
        );
        Exercise {
            id: self.id,
            title: self.title,
            task: self.task,
            formula: self.formula,
            cell: self.cell,
            steps: self.steps,
            answer,
            cross_check,
        }
    }
}

/// Cell in 0-based column `col` at 1-based sheet row `sheet_row`.
pub(crate) fn result_cell(col: usize, sheet_row: usize) -> CellRef {
    CellRef::new(col, sheet_row.saturating_sub(1))
}

/// `a + b + c`, shortened in the middle for long lists.
fn sum_expression(values: &[f64], style: NumberStyle) -> String {
    const MAX_TERMS: usize = 12;
    let terms: Vec<String> = values.iter().map(|v| style.render(*v)).collect();
    if terms.len() <= MAX_TERMS {
        return terms.join(" + ");
    }
    let head = terms[..3].join(" + ");
    let tail = terms[terms.len() - 2..].join(" + ");
    format!("{head} + … + {tail}")
}

/// SUM/AVERAGE/MIN/MAX/COUNT with optional criteria, in either the `*IF` or
/// the `*IFS` spelling.
#[derive(Clone, Debug)]
pub struct AggregateSpec {
    pub aggregate: Aggregate,
    pub column: ColumnId,
    pub predicates: Vec<Predicate>,
    /// Write the formula with the `*IFS` function even for one criterion.
    pub ifs_form: bool,
    pub style: NumberStyle,
}

impl AggregateSpec {
    pub fn new(aggregate: Aggregate, column: ColumnId) -> AggregateSpec {
        AggregateSpec {
            aggregate,
            column,
            predicates: Vec::new(),
            ifs_form: false,
            style: NumberStyle::Plain,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn ifs(mut self) -> Self {
        self.ifs_form = true;
        self
    }

    pub fn style(mut self, style: NumberStyle) -> Self {
        self.style = style;
        self
    }

    fn counts_rows(&self) -> bool {
        self.aggregate == Aggregate::Count && !self.predicates.is_empty()
    }

    pub fn function_name(&self) -> &'static str {
        if self.predicates.is_empty() {
            self.aggregate.function_name()
        } else if self.ifs_form {
            self.aggregate.conditional_name(2)
        } else {
            self.aggregate.conditional_name(self.predicates.len())
        }
    }

    pub fn formula(&self, table: &Table) -> String {
        let name = self.function_name();
        let value_range = table.range_label(self.column);
        let criteria: Vec<String> = self
            .predicates
            .iter()
            .map(|p| format!("{},{}", table.range_label(p.column), p.criterion.formula_text()))
            .collect();
        if criteria.is_empty() {
            format!("={name}({value_range})")
        } else if self.counts_rows() {
            format!("={name}({})", criteria.join(","))
        } else if name.ends_with("IFS") {
            format!("={name}({value_range},{})", criteria.join(","))
        } else {
            format!("={name}({},{value_range})", criteria.join(","))
        }
    }

    pub fn build(
        &self,
        table: &Table,
        builder: ExerciseBuilder,
        resolved: Option<&ResolvedSheet>,
    ) -> Exercise {
        let mut b = builder.formula(self.formula(table));
        let answer = self.derive(table, &mut b);
        b.finish(answer, resolved)
    }

    fn derive(&self, table: &Table, b: &mut ExerciseBuilder) -> Result<Answer, QueryError> {
        let header = table.header(self.column).to_string();
        let range = table.range_label(self.column);

        let rows = filter_rows(table, &self.predicates)?;
        if self.predicates.is_empty() {
            b.step(format!(
                "Take every value in {range} ({header}): {} rows.",
                table.len()
            ));
        } else {
            let conditions: Vec<String> =
                self.predicates.iter().map(|p| p.describe(table)).collect();
            let mut columns: Vec<(ColumnId, NumberStyle)> = Vec::new();
            for p in &self.predicates {
                if !columns.iter().any(|(c, _)| *c == p.column) {
                    columns.push((p.column, NumberStyle::Plain));
                }
            }
            if !self.counts_rows() && !columns.iter().any(|(c, _)| *c == self.column) {
                columns.push((self.column, self.style));
            }
            b.detail(
                format!(
                    "Keep the rows where {}: {} of {} rows match.",
                    conditions.join(" AND "),
                    rows.len(),
                    table.len()
                ),
                Detail::Table(DisplayTable::from_rows(table, &rows, &columns)),
            );
        }

        if self.counts_rows() {
            b.step(format!("Count the matching rows: {}.", rows.len()));
            return Ok(Answer::scalar(Value::Number(rows.len() as f64), NumberStyle::Plain));
        }

        let selection = select_numbers(table, self.column, &self.predicates)?;
        for &i in rows.iter().filter(|i| !selection.rows.contains(*i)) {
            let value = table.value(i, self.column);
            if !value.is_empty() {
                b.flag(format!(
                    "Row {}: {header} is {}, skipped because it is not a number.",
                    table.sheet_row(i),
                    format_value(value)
                ));
            }
        }

        let result = reduce(&selection.values, self.aggregate, &header)?;
        let n = selection.values.len();
        match self.aggregate {
            Aggregate::Sum => b.step(format!(
                "Add them up: {} = {}.",
                sum_expression(&selection.values, self.style),
                self.style.render(result)
            )),
            Aggregate::Average => {
                let total: f64 = selection.values.iter().sum();
                b.step(format!(
                    "Add them up ({}) and divide by the {n} values: {} / {n} = {}.",
                    self.style.render(total),
                    self.style.render(total),
                    self.style.render(result)
                ));
            }
            Aggregate::Max | Aggregate::Min => {
                let word = if self.aggregate == Aggregate::Max {
                    "largest"
                } else {
                    "smallest"
                };
                let row = selection
                    .values
                    .iter()
                    .position(|v| *v == result)
                    .and_then(|p| selection.rows.get(p))
                    .map(|&i| table.sheet_row(i));
                match row {
                    Some(r) => b.step(format!(
                        "The {word} of the {n} values is {} (row {r}).",
                        self.style.render(result)
                    )),
                    None => b.step(format!("The {word} value is {}.", self.style.render(result))),
                }
            }
            Aggregate::Count => b.step(format!("Count the numeric cells: {n}.")),
        }
        Ok(Answer::scalar(Value::Number(result), self.style))
    }
}

/// Why a single row of a filled-down formula has no value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RowFailure {
    pub error: CellError,
    pub reason: String,
}

impl RowFailure {
    pub fn new(error: CellError, reason: impl Into<String>) -> RowFailure {
        RowFailure {
            error,
            reason: reason.into(),
        }
    }

    /// The input cell was not a usable number.
    pub fn not_a_number(table: &Table, index: usize, col: ColumnId) -> RowFailure {
        RowFailure::new(
            CellError::Value,
            format!(
                "{} is {}, not a number",
                table.header(col),
                format_value(table.value(index, col))
            ),
        )
    }
}

impl From<QueryError> for RowFailure {
    fn from(e: QueryError) -> Self {
        RowFailure::new(e.cell_error(), e.to_string())
    }
}

/// A formula filled down the whole table (`=D2*F2`, `=LEFT(B2,3)`, ...).
pub(crate) struct FilledColumn<'a> {
    pub header: &'a str,
    pub label_col: ColumnId,
    pub inputs: Vec<(ColumnId, NumberStyle)>,
    pub style: NumberStyle,
}

impl FilledColumn<'_> {
    /// Evaluate `row_fn` on every row. Failures become error cells and are
    /// flagged; the exercise itself still succeeds.
    pub fn derive<F>(&self, table: &Table, b: &mut ExerciseBuilder, row_fn: F) -> Answer
    where
        F: Fn(usize) -> Result<Value, RowFailure>,
    {
        let mut shown = DisplayTable::new(
            std::iter::once("Row".to_string())
                .chain(std::iter::once(table.header(self.label_col).to_string()))
                .chain(self.inputs.iter().map(|(c, _)| table.header(*c).to_string()))
                .chain(std::iter::once(self.header.to_string()))
                .collect(),
        );
        let mut entries = Vec::with_capacity(table.len());
        let mut failures = Vec::new();

        for i in 0..table.len() {
            let label = format_value(table.value(i, self.label_col));
            let value = match row_fn(i) {
                Ok(v) => v,
                Err(failure) => {
                    failures.push((i, label.clone(), failure.clone()));
                    Value::Error(failure.error)
                }
            };
            let display = self.style.render_value(&value);

            let mut cells = vec![table.sheet_row(i).to_string(), label.clone()];
            cells.extend(
                self.inputs
                    .iter()
                    .map(|(c, style)| style.render_value(table.value(i, *c))),
            );
            cells.push(display.clone());
            shown.rows.push(cells);

            entries.push(ColumnEntry {
                sheet_row: table.sheet_row(i),
                label,
                value,
                display,
            });
        }

        b.detail(
            format!(
                "Fill the formula down rows {}–{}.",
                table.first_data_row(),
                table.last_data_row()
            ),
            Detail::Table(shown),
        );
        for (i, label, failure) in failures {
            b.flag(format!(
                "Row {} ({label}): {}, so the cell shows {}.",
                table.sheet_row(i),
                failure.reason,
                failure.error
            ));
        }

        Answer::Column {
            header: self.header.to_string(),
            rows: entries,
        }
    }
}

/// `INDEX(result, MATCH(MAX(measure), measure, 0))`: the row holding the
/// largest measure.
pub(crate) fn top_row_exercise(
    table: &Table,
    builder: ExerciseBuilder,
    measure: (ColumnId, NumberStyle),
    result: (ColumnId, NumberStyle),
    resolved: Option<&ResolvedSheet>,
) -> Exercise {
    let measure_range = table.range_label(measure.0);
    let result_range = table.range_label(result.0);
    let mut b = builder.formula(format!(
        "=INDEX({result_range},MATCH(MAX({measure_range}),{measure_range},0))"
    ));
    let answer = derive_top_row(table, &mut b, measure, result);
    b.finish(answer, resolved)
}

fn derive_top_row(
    table: &Table,
    b: &mut ExerciseBuilder,
    (measure_col, measure_style): (ColumnId, NumberStyle),
    (result_col, result_style): (ColumnId, NumberStyle),
) -> Result<Answer, QueryError> {
    let measure_range = table.range_label(measure_col);
    let result_range = table.range_label(result_col);

    let top = extremum_row(table, measure_col, Extremum::Max)?;
    b.step(format!(
        "MAX({measure_range}) = {}.",
        measure_style.render_value(&top.value)
    ));
    let position = top.index + 1;
    b.step(format!(
        "MATCH finds it first at position {position} of {measure_range} (row {}).",
        top.sheet_row
    ));
    let found = index(table, result_col, position)?;
    b.step(format!(
        "INDEX({result_range}, {position}) = {}.",
        result_style.render_value(&found.value)
    ));
    Ok(Answer::scalar(found.value, result_style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetwise_engine::engine::Criterion;

    fn table() -> Table {
        Table::from_rows(
            "Sales",
            &["Product", "Units Sold"],
            vec![
                vec![Value::text("P001"), Value::Number(10.0)],
                vec![Value::text("P002"), Value::invalid("five")],
                vec![Value::text("P001"), Value::Number(20.0)],
            ],
        )
    }

    #[test]
    fn test_formula_spellings() {
        let t = table();
        let p001 = Predicate::new(ColumnId(0), Criterion::eq("P001"));
        let sum = AggregateSpec::new(Aggregate::Sum, ColumnId(1));
        assert_eq!(sum.formula(&t), "=SUM(B2:B4)");
        let sumif = sum.clone().filter(p001.clone());
        assert_eq!(sumif.formula(&t), "=SUMIF(A2:A4,\"P001\",B2:B4)");
        assert_eq!(sumif.clone().ifs().formula(&t), "=SUMIFS(B2:B4,A2:A4,\"P001\")");
        let countif = AggregateSpec::new(Aggregate::Count, ColumnId(0)).filter(p001);
        assert_eq!(countif.formula(&t), "=COUNTIF(A2:A4,\"P001\")");
    }

    #[test]
    fn test_aggregate_flags_skipped_cells() {
        let t = table();
        let b = ExerciseBuilder::new("T1", "Total units", result_cell(3, 2));
        let ex = AggregateSpec::new(Aggregate::Sum, ColumnId(1)).build(&t, b, None);
        assert_eq!(
            ex.answer.unwrap().first_value(),
            Some(&Value::Number(30.0))
        );
        assert!(ex.steps.iter().any(|s| s.flagged && s.text.contains("five")));
        assert_eq!(
            ex.cross_check.status,
            CheckStatus::Unavailable("resolved file not loaded".into())
        );
    }

    #[test]
    fn test_empty_selection_fails_only_the_exercise() {
        let t = table();
        let none = Predicate::new(ColumnId(0), Criterion::eq("P404"));
        let b = ExerciseBuilder::new("T2", "Average", result_cell(3, 3));
        let ex = AggregateSpec::new(Aggregate::Average, ColumnId(1))
            .filter(none)
            .build(&t, b, None);
        assert!(matches!(ex.answer, Err(QueryError::EmptySelection { .. })));
        assert!(ex.steps.last().is_some_and(|s| s.flagged));
        assert!(ex.answer_text().starts_with("#DIV/0!"));
    }

    #[test]
    fn test_sum_expression_shortens_long_lists() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(sum_expression(&values, NumberStyle::Plain), "1 + 2 + 3 + … + 19 + 20");
        assert_eq!(sum_expression(&[1.5, 2.0], NumberStyle::Currency), "$1.50 + $2.00");
    }
}
