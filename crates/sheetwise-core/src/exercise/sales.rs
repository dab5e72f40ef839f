//! Sales exercises: totals, averages, conditional counts and revenue.

use sheetwise_engine::engine::{
    Aggregate, ColumnId, Criterion, Predicate, QueryError, Table, Value, products, sum_product,
};

use super::{
    Answer, AggregateSpec, Detail, DisplayTable, Exercise, ExerciseBuilder, NumberStyle,
    result_cell, top_row_exercise,
};
use crate::resolved::ResolvedSheet;

/// Column `H`.
const RESULT_COL: usize = 7;

pub(super) fn exercises(
    table: &Table,
    resolved: Option<&ResolvedSheet>,
) -> Result<Vec<Exercise>, QueryError> {
    let date = table.column("Date")?;
    let product = table.column("Product")?;
    let units = table.column("Units Sold")?;
    let price = table.column("Price per Unit")?;
    let at = |row| result_cell(RESULT_COL, row);

    let mut out = Vec::new();

    out.push(AggregateSpec::new(Aggregate::Sum, units).build(
        table,
        ExerciseBuilder::new("S1", "Total units sold", at(2))
            .task("Add up the Units Sold column."),
        resolved,
    ));
    out.push(
        AggregateSpec::new(Aggregate::Average, price)
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("S2", "Average price per unit", at(3))
                    .task("Average the Price per Unit column."),
                resolved,
            ),
    );
    out.push(AggregateSpec::new(Aggregate::Max, units).build(
        table,
        ExerciseBuilder::new("S3", "Largest sale", at(4))
            .task("Find the most units sold in a single sale."),
        resolved,
    ));
    out.push(AggregateSpec::new(Aggregate::Min, units).build(
        table,
        ExerciseBuilder::new("S4", "Smallest sale", at(5))
            .task("Find the fewest units sold in a single sale."),
        resolved,
    ));
    out.push(
        AggregateSpec::new(Aggregate::Count, product)
            .filter(Predicate::new(product, Criterion::eq("P002")))
            .build(
                table,
                ExerciseBuilder::new("S5", "Sales of P002", at(6))
                    .task("Count how many sales were of product P002."),
                resolved,
            ),
    );
    out.push(
        AggregateSpec::new(Aggregate::Sum, units)
            .filter(Predicate::new(product, Criterion::eq("P001")))
            .build(
                table,
                ExerciseBuilder::new("S6", "Units of P001", at(7))
                    .task("Add up the units sold for product P001 only."),
                resolved,
            ),
    );
    out.push(
        AggregateSpec::new(Aggregate::Count, units)
            .filter(Predicate::new(units, Criterion::gt(15.0)))
            .build(
                table,
                ExerciseBuilder::new("S7", "Sales above 15 units", at(8)).task(
                    "Count the sales of more than 15 units. A sale of exactly 15 does not count.",
                ),
                resolved,
            ),
    );
    out.push(revenue(
        table,
        units,
        price,
        ExerciseBuilder::new("S8", "Total revenue", at(9))
            .task("Multiply units by price on every row and add the results."),
        resolved,
    ));
    out.push(top_row_exercise(
        table,
        ExerciseBuilder::new("S9", "Date of the biggest sale", at(10))
            .task("Find the date of the sale with the most units."),
        (units, NumberStyle::Plain),
        (date, NumberStyle::Plain),
        resolved,
    ));

    Ok(out)
}

fn revenue(
    table: &Table,
    units: ColumnId,
    price: ColumnId,
    builder: ExerciseBuilder,
    resolved: Option<&ResolvedSheet>,
) -> Exercise {
    let units_range = table.range_label(units);
    let price_range = table.range_label(price);
    let mut b = builder.formula(format!("=SUMPRODUCT({units_range},{price_range})"));

    let answer = products(table, units, price).and_then(|pairs| {
        let mut shown = DisplayTable::new(vec![
            "Row".to_string(),
            table.header(units).to_string(),
            table.header(price).to_string(),
            "Revenue".to_string(),
        ]);
        for &(i, p) in &pairs {
            shown.rows.push(vec![
                table.sheet_row(i).to_string(),
                NumberStyle::Plain.render_value(table.value(i, units)),
                NumberStyle::Currency.render_value(table.value(i, price)),
                NumberStyle::Currency.render(p),
            ]);
        }
        b.detail("Multiply units by price on each row.", Detail::Table(shown));
        let skipped = table.len() - pairs.len();
        if skipped > 0 {
            b.flag(format!("{skipped} row(s) skipped because a side is not a number."));
        }
        let total = sum_product(table, units, price)?;
        b.step(format!(
            "Add the {} products: {}.",
            pairs.len(),
            NumberStyle::Currency.render(total)
        ));
        Ok(Answer::scalar(Value::Number(total), NumberStyle::Currency))
    });
    b.finish(answer, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{SALES, table_from_sheet};
    use crate::storage::parse_csv_content;
    use sheetwise_engine::engine::format_value;
    use std::path::Path;

    const CSV: &str = "Date,Product,Units Sold,Price per Unit\n\
        2024-01-05,P001,10,$25.00\n\
        2024-01-06,P002,5,$40.00\n\
        2024-01-07,P001,20,$25.00\n\
        2024-01-08,P003,15,$15.50\n";

    fn sales() -> Table {
        table_from_sheet(&SALES, &parse_csv_content(Path::new("sales.csv"), CSV)).unwrap()
    }

    fn scalar(ex: &Exercise) -> Value {
        ex.answer.as_ref().unwrap().first_value().unwrap().clone()
    }

    #[test]
    fn test_catalog_formulas_follow_table_size() {
        let all = exercises(&sales(), None).unwrap();
        let formulas: Vec<&str> = all.iter().map(|e| e.formula.as_str()).collect();
        assert_eq!(formulas[0], "=SUM(C2:C5)");
        assert_eq!(formulas[4], "=COUNTIF(B2:B5,\"P002\")");
        assert_eq!(formulas[5], "=SUMIF(B2:B5,\"P001\",C2:C5)");
        assert_eq!(formulas[6], "=COUNTIF(C2:C5,\">15\")");
        assert_eq!(formulas[7], "=SUMPRODUCT(C2:C5,D2:D5)");
        assert_eq!(formulas[8], "=INDEX(A2:A5,MATCH(MAX(C2:C5),C2:C5,0))");
        assert_eq!(all[0].cell.to_string(), "H2");
        assert_eq!(all[8].cell.to_string(), "H10");
    }

    #[test]
    fn test_values() {
        let all = exercises(&sales(), None).unwrap();
        assert_eq!(scalar(&all[0]), Value::Number(50.0));
        assert_eq!(scalar(&all[5]), Value::Number(30.0));
        // 15 is not above 15
        assert_eq!(scalar(&all[6]), Value::Number(1.0));
        assert_eq!(scalar(&all[7]), Value::Number(1182.5));
        assert_eq!(format_value(&scalar(&all[8])), "2024-01-07");
    }
}
