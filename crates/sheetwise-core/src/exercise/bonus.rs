//! Employee bonus exercises: multi-criteria aggregates and filled-down
//! per-employee formulas.

use sheetwise_engine::engine::{
    Aggregate, CellError, ColumnId, Comparison, Criterion, Predicate, QueryError, Table, Value,
    divide,
};

use super::{
    AggregateSpec, Exercise, ExerciseBuilder, FilledColumn, NumberStyle, RowFailure, result_cell,
};
use crate::resolved::ResolvedSheet;

/// Salaries at or above this amount are in the "High" band.
pub const SALARY_BAND_THRESHOLD: f64 = 60_000.0;

const BAND_COMPARISON: Comparison = Comparison::Ge;

/// Column `J`.
const AGGREGATE_COL: usize = 9;
/// Columns `G`, `H` and `I`.
const BONUS_COL: usize = 6;
const RECOVERED_COL: usize = 7;
const BAND_COL: usize = 8;

pub(super) fn exercises(
    table: &Table,
    resolved: Option<&ResolvedSheet>,
) -> Result<Vec<Exercise>, QueryError> {
    let name = table.column("Name")?;
    let department = table.column("Department")?;
    let salary = table.column("Salary")?;
    let years = table.column("Years of Service")?;
    let bonus = table.column("Bonus %")?;
    let at = |row| result_cell(AGGREGATE_COL, row);

    let mut out = vec![
        AggregateSpec::new(Aggregate::Sum, salary)
            .filter(Predicate::new(department, Criterion::eq("IT")))
            .filter(Predicate::new(years, Criterion::gt(5.0)))
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("B1", "IT salaries, more than 5 years", at(2)).task(
                    "Add up the salaries of IT staff with more than 5 years of service.",
                ),
                resolved,
            ),
        AggregateSpec::new(Aggregate::Count, department)
            .filter(Predicate::new(department, Criterion::eq("Sales")))
            .filter(Predicate::new(years, Criterion::ge(5.0)))
            .build(
                table,
                ExerciseBuilder::new("B2", "Sales staff with 5+ years", at(3))
                    .task("Count Sales employees with at least 5 years of service."),
                resolved,
            ),
        AggregateSpec::new(Aggregate::Average, salary)
            .filter(Predicate::new(bonus, Criterion::gt(0.05)))
            .ifs()
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("B3", "Average salary, bonus above 5%", at(4))
                    .task("Average the salaries of employees whose bonus is above 5%."),
                resolved,
            ),
        AggregateSpec::new(Aggregate::Max, salary)
            .filter(Predicate::new(department, Criterion::eq("HR")))
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("B4", "Highest HR salary", at(5))
                    .task("Find the highest salary in HR."),
                resolved,
            ),
        AggregateSpec::new(Aggregate::Min, salary)
            .filter(Predicate::new(years, Criterion::ge(5.0)))
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("B5", "Lowest salary, 5+ years", at(6))
                    .task("Find the lowest salary among employees with at least 5 years."),
                resolved,
            ),
    ];

    let first = table.first_data_row();

    // G: bonus amount
    let salary_ref = format!("{}{first}", table.column_letter(salary));
    let bonus_ref = format!("{}{first}", table.column_letter(bonus));
    let mut b = ExerciseBuilder::new("B6", "Bonus amount", result_cell(BONUS_COL, first))
        .task("Work out each employee's bonus: salary times bonus percentage.")
        .formula(format!("={salary_ref}*{bonus_ref}"));
    let amounts = FilledColumn {
        header: "Bonus",
        label_col: name,
        inputs: vec![(salary, NumberStyle::Currency), (bonus, NumberStyle::Percent)],
        style: NumberStyle::Currency,
    };
    let answer = amounts.derive(table, &mut b, |i| bonus_amount(table, i, salary, bonus));
    out.push(b.finish(Ok(answer), resolved));

    // H: salary recovered from the bonus
    let bonus_cell = result_cell(BONUS_COL, first).to_string();
    let mut b = ExerciseBuilder::new(
        "B7",
        "Salary recovered from bonus",
        result_cell(RECOVERED_COL, first),
    )
    .task("Divide each bonus by its percentage to get the salary back.")
    .formula(format!("={bonus_cell}/{bonus_ref}"));
    let recovered = FilledColumn {
        header: "Recovered Salary",
        label_col: name,
        inputs: vec![(salary, NumberStyle::Currency), (bonus, NumberStyle::Percent)],
        style: NumberStyle::Currency,
    };
    let answer = recovered.derive(table, &mut b, |i| {
        let amount = bonus_amount(table, i, salary, bonus)?
            .as_number()
            .ok_or_else(|| RowFailure::new(CellError::Value, "the bonus is not a number"))?;
        let fraction = table
            .value(i, bonus)
            .as_number()
            .ok_or_else(|| RowFailure::not_a_number(table, i, bonus))?;
        if fraction == 0.0 {
            return Err(RowFailure::new(
                CellError::DivZero,
                "the bonus percentage is 0",
            ));
        }
        Ok(Value::Number(divide(amount, fraction)?))
    });
    out.push(b.finish(Ok(answer), resolved));

    // I: salary band
    let band = Criterion::new(BAND_COMPARISON, SALARY_BAND_THRESHOLD);
    let mut b = ExerciseBuilder::new("B8", "Salary band", result_cell(BAND_COL, first))
        .task(format!(
            "Label each salary High when it is {} {} and Low otherwise.",
            BAND_COMPARISON.symbol(),
            NumberStyle::Currency.render(SALARY_BAND_THRESHOLD)
        ))
        .formula(format!(
            "=IF({salary_ref}{}{},\"High\",\"Low\")",
            BAND_COMPARISON.symbol(),
            SALARY_BAND_THRESHOLD
        ));
    let bands = FilledColumn {
        header: "Band",
        label_col: name,
        inputs: vec![(salary, NumberStyle::Currency)],
        style: NumberStyle::Plain,
    };
    let answer = bands.derive(table, &mut b, |i| {
        let value = table.value(i, salary);
        if value.as_number().is_none() {
            return Err(RowFailure::not_a_number(table, i, salary));
        }
        Ok(Value::text(if band.matches(value) { "High" } else { "Low" }))
    });

    let high = (0..table.len())
        .filter(|&i| band.matches(table.value(i, salary)))
        .count();
    b.step(format!(
        "{high} employee(s) are High and {} are Low.",
        table.len() - high
    ));
    let on_threshold = (0..table.len())
        .filter(|&i| table.value(i, salary).as_number() == Some(SALARY_BAND_THRESHOLD));
    for i in on_threshold {
        b.step(format!(
            "Row {} earns exactly {}, which is High because the test is {}.",
            table.sheet_row(i),
            NumberStyle::Currency.render(SALARY_BAND_THRESHOLD),
            BAND_COMPARISON.symbol()
        ));
    }
    out.push(b.finish(Ok(answer), resolved));

    Ok(out)
}

fn bonus_amount(
    table: &Table,
    i: usize,
    salary: ColumnId,
    bonus: ColumnId,
) -> Result<Value, RowFailure> {
    let s = table
        .value(i, salary)
        .as_number()
        .ok_or_else(|| RowFailure::not_a_number(table, i, salary))?;
    let f = table
        .value(i, bonus)
        .as_number()
        .ok_or_else(|| RowFailure::not_a_number(table, i, bonus))?;
    Ok(Value::Number(s * f))
}
