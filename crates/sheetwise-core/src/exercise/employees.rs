//! Employee exercises: the four lookup styles plus department statistics.

use serde::Serialize;
use sheetwise_engine::engine::{
    Aggregate, ColumnId, Criterion, Predicate, QueryError, Table, Value, lookup_exact,
    lookup_positional,
};

use super::{
    AggregateSpec, Answer, Detail, Exercise, ExerciseBuilder, NumberStyle, result_cell,
    top_row_exercise,
};
use crate::resolved::ResolvedSheet;

/// Column `G`.
const RESULT_COL: usize = 6;

/// Which spreadsheet function a lookup is written with. All of them find
/// the first exact match; only the formula text differs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFlavour {
    Vlookup,
    IndexMatch,
    Lookup,
    Xlookup,
}

impl LookupFlavour {
    pub fn label(self) -> &'static str {
        match self {
            LookupFlavour::Vlookup => "VLOOKUP",
            LookupFlavour::IndexMatch => "INDEX/MATCH",
            LookupFlavour::Lookup => "LOOKUP",
            LookupFlavour::Xlookup => "XLOOKUP",
        }
    }
}

/// Find `key` in `key_column` and report `result_column` of that row.
#[derive(Clone, Debug)]
pub struct LookupSpec {
    pub flavour: LookupFlavour,
    pub key: String,
    pub key_column: &'static str,
    pub result_column: &'static str,
    pub style: NumberStyle,
}

impl LookupSpec {
    pub fn new(
        flavour: LookupFlavour,
        key: impl Into<String>,
        key_column: &'static str,
        result_column: &'static str,
    ) -> LookupSpec {
        LookupSpec {
            flavour,
            key: key.into(),
            key_column,
            result_column,
            style: NumberStyle::Plain,
        }
    }

    pub fn style(mut self, style: NumberStyle) -> Self {
        self.style = style;
        self
    }

    pub fn formula(&self, table: &Table) -> Result<String, QueryError> {
        let key_col = table.column(self.key_column)?;
        let result_col = table.column(self.result_column)?;
        let keys = table.range_label(key_col);
        let results = table.range_label(result_col);
        let key = &self.key;
        Ok(match self.flavour {
            LookupFlavour::Vlookup => {
                let offset = vlookup_offset(key_col, result_col);
                format!(
                    "=VLOOKUP(\"{key}\",{},{offset},FALSE)",
                    table.block_label(key_col, result_col)
                )
            }
            LookupFlavour::IndexMatch => format!("=INDEX({results},MATCH(\"{key}\",{keys},0))"),
            LookupFlavour::Lookup => format!("=LOOKUP(\"{key}\",{keys},{results})"),
            LookupFlavour::Xlookup => format!("=XLOOKUP(\"{key}\",{keys},{results})"),
        })
    }

    pub fn build(
        &self,
        table: &Table,
        builder: ExerciseBuilder,
        resolved: Option<&ResolvedSheet>,
    ) -> Result<Exercise, QueryError> {
        let mut b = builder.formula(self.formula(table)?);
        let answer = self.derive(table, &mut b);
        Ok(b.finish(answer, resolved))
    }

    fn derive(&self, table: &Table, b: &mut ExerciseBuilder) -> Result<Answer, QueryError> {
        let key_col = table.column(self.key_column)?;
        let result_col = table.column(self.result_column)?;
        let key = Value::text(self.key.as_str());
        let keys = table.range_label(key_col);

        b.step(format!(
            "Search {keys} ({}) for \"{}\", top to bottom.",
            self.key_column, self.key
        ));
        let (sheet_row, value, pairs) = match self.flavour {
            LookupFlavour::IndexMatch => {
                let found = lookup_positional(table, key_col, &key, result_col)?;
                b.step(format!(
                    "MATCH returns position {} of {keys}, which is sheet row {} once the header row is counted.",
                    found.position, found.sheet_row
                ));
                let pairs = vec![
                    ("Position".to_string(), found.position.to_string()),
                    ("Sheet row".to_string(), found.sheet_row.to_string()),
                ];
                (found.sheet_row, found.value, pairs)
            }
            _ => {
                let found = lookup_exact(table, key_col, &key, result_col)?;
                if self.flavour == LookupFlavour::Vlookup {
                    b.step(format!(
                        "{} is column {} of {}.",
                        self.result_column,
                        vlookup_offset(key_col, result_col),
                        table.block_label(key_col, result_col)
                    ));
                }
                let pairs = vec![("Sheet row".to_string(), found.sheet_row.to_string())];
                (found.sheet_row, found.value, pairs)
            }
        };

        let mut pairs = pairs;
        pairs.push((self.result_column.to_string(), self.style.render_value(&value)));
        b.detail(
            format!("Found \"{}\" on row {sheet_row}.", self.key),
            Detail::Pairs(pairs),
        );
        b.step(format!(
            "{} returns {}.",
            self.flavour.label(),
            self.style.render_value(&value)
        ));
        Ok(Answer::scalar(value, self.style))
    }
}

/// 1-based column number of `result` inside a block starting at `key`.
fn vlookup_offset(key: ColumnId, result: ColumnId) -> usize {
    result.0.saturating_sub(key.0) + 1
}

pub(super) fn exercises(
    table: &Table,
    resolved: Option<&ResolvedSheet>,
) -> Result<Vec<Exercise>, QueryError> {
    let name = table.column("Name")?;
    let department = table.column("Department")?;
    let salary = table.column("Salary")?;
    let at = |row| result_cell(RESULT_COL, row);

    let mut out = vec![
        LookupSpec::new(LookupFlavour::Vlookup, "Carol White", "Name", "Salary")
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("E1", "Carol White's salary", at(2))
                    .task("Look up Carol White's salary with VLOOKUP."),
                resolved,
            )?,
        LookupSpec::new(LookupFlavour::IndexMatch, "Frank Miller", "Name", "Department").build(
            table,
            ExerciseBuilder::new("E2", "Frank Miller's department", at(3))
                .task("Find Frank Miller's department with INDEX and MATCH."),
            resolved,
        )?,
        LookupSpec::new(LookupFlavour::Lookup, "Grace Lee", "Name", "Employee ID").build(
            table,
            ExerciseBuilder::new("E3", "Grace Lee's employee ID", at(4))
                .task("Find Grace Lee's employee ID with LOOKUP."),
            resolved,
        )?,
        LookupSpec::new(LookupFlavour::Xlookup, "Irene Clark", "Name", "Department").build(
            table,
            ExerciseBuilder::new("E4", "Irene Clark's department", at(5))
                .task("Find Irene Clark's department with XLOOKUP."),
            resolved,
        )?,
    ];

    out.push(
        AggregateSpec::new(Aggregate::Average, salary)
            .filter(Predicate::new(department, Criterion::eq("IT")))
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("E5", "Average IT salary", at(6))
                    .task("Average the salaries of the IT department."),
                resolved,
            ),
    );
    out.push(
        AggregateSpec::new(Aggregate::Count, department)
            .filter(Predicate::new(department, Criterion::eq("Sales")))
            .build(
                table,
                ExerciseBuilder::new("E6", "Sales headcount", at(7))
                    .task("Count the employees in the Sales department."),
                resolved,
            ),
    );
    out.push(top_row_exercise(
        table,
        ExerciseBuilder::new("E7", "Top earner", at(8))
            .task("Find the name of the highest-paid employee."),
        (salary, NumberStyle::Currency),
        (name, NumberStyle::Plain),
        resolved,
    ));
    out.push(
        AggregateSpec::new(Aggregate::Sum, salary)
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("E8", "Total payroll", at(9))
                    .task("Add up every salary."),
                resolved,
            ),
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{EMPLOYEES, table_from_sheet};
    use crate::storage::parse_csv_content;
    use std::path::Path;

    fn staff() -> Table {
        let csv = "Employee ID,Name,Department,Salary\n\
            E001,Alice Johnson,Sales,\"$55,000\"\n\
            E002,Carol White,IT,\"$72,000\"\n\
            E003,Frank Miller,Finance,\"$80,000\"\n";
        table_from_sheet(&EMPLOYEES, &parse_csv_content(Path::new("e.csv"), csv)).unwrap()
    }

    #[test]
    fn test_flavour_formulas() {
        let t = staff();
        let f = |flavour, result| {
            LookupSpec::new(flavour, "Carol White", "Name", result)
                .formula(&t)
                .unwrap()
        };
        assert_eq!(
            f(LookupFlavour::Vlookup, "Salary"),
            "=VLOOKUP(\"Carol White\",B2:D4,3,FALSE)"
        );
        assert_eq!(
            f(LookupFlavour::IndexMatch, "Department"),
            "=INDEX(C2:C4,MATCH(\"Carol White\",B2:B4,0))"
        );
        assert_eq!(
            f(LookupFlavour::Lookup, "Employee ID"),
            "=LOOKUP(\"Carol White\",B2:B4,A2:A4)"
        );
        assert_eq!(
            f(LookupFlavour::Xlookup, "Department"),
            "=XLOOKUP(\"Carol White\",B2:B4,C2:C4)"
        );
    }

    #[test]
    fn test_every_flavour_finds_the_same_row() {
        let t = staff();
        for flavour in [
            LookupFlavour::Vlookup,
            LookupFlavour::IndexMatch,
            LookupFlavour::Lookup,
            LookupFlavour::Xlookup,
        ] {
            let b = ExerciseBuilder::new("X", "x", result_cell(RESULT_COL, 2));
            let ex = LookupSpec::new(flavour, "Frank Miller", "Name", "Salary")
                .build(&t, b, None)
                .unwrap();
            assert_eq!(
                ex.answer.unwrap().first_value(),
                Some(&Value::Number(80000.0)),
                "{flavour:?}"
            );
        }
    }

    #[test]
    fn test_unknown_name_fails_with_not_available() {
        let t = staff();
        let b = ExerciseBuilder::new("X", "x", result_cell(RESULT_COL, 2));
        let ex = LookupSpec::new(LookupFlavour::Vlookup, "Zoe", "Name", "Salary")
            .build(&t, b, None)
            .unwrap();
        assert!(matches!(ex.answer, Err(QueryError::LookupNotFound { .. })));
        assert!(ex.answer_text().starts_with("#N/A"));
    }
}
