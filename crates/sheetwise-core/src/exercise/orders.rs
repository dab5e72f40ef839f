//! Order exercises: date and time arithmetic, text extraction, discounts and
//! date/time criteria.

use chrono::Datelike;
use sheetwise_engine::engine::datetime::{date_of, time_of};
use sheetwise_engine::engine::text::{left, right, split_first_space};
use sheetwise_engine::engine::{
    Aggregate, CellError, ColumnId, Criterion, Predicate, QueryError, Table, TimeCutoff, Value,
    add_days, apply_rate_if, compare_time, format_plain, format_value, index,
};

use super::{
    AggregateSpec, Answer, Exercise, ExerciseBuilder, FilledColumn, NumberStyle, RowFailure,
    result_cell,
};
use crate::resolved::ResolvedSheet;

const DELIVERY_DAYS: i64 = 3;
const PREFIX_LEN: usize = 3;
const SUFFIX_LEN: usize = 5;
const DISCOUNT_THRESHOLD: f64 = 100.0;
const DISCOUNT_RATE: f64 = 0.10;
const LOOKUP_ORDER_ID: usize = 7;

/// Columns `F` to `K` hold filled-down formulas.
const DELIVERY_COL: usize = 5;
const SHIFT_COL: usize = 6;
const PREFIX_COL: usize = 7;
const SUFFIX_COL: usize = 8;
const FIRST_NAME_COL: usize = 9;
const DISCOUNT_COL: usize = 10;
/// Column `M`.
const SUMMARY_COL: usize = 12;

pub(super) fn exercises(
    table: &Table,
    resolved: Option<&ResolvedSheet>,
) -> Result<Vec<Exercise>, QueryError> {
    let order_id = table.column("Order ID")?;
    let customer = table.column("Customer Name")?;
    let order_date = table.column("Order Date")?;
    let order_time = table.column("Order Time")?;
    let amount = table.column("Order Amount")?;

    let noon = time_of(12, 0, 0).ok_or(QueryError::DateOutOfRange)?;
    let revenue_from = date_of(2024, 3, 15).ok_or(QueryError::DateOutOfRange)?;
    let first = table.first_data_row();
    let cell_of = |col: ColumnId| format!("{}{first}", table.column_letter(col));

    let mut out = Vec::new();

    // F: delivery date
    let mut b = ExerciseBuilder::new("O1", "Delivery date", result_cell(DELIVERY_COL, first))
        .task(format!("Each order is delivered {DELIVERY_DAYS} days after it is placed."))
        .formula(format!("={}+{DELIVERY_DAYS}", cell_of(order_date)));
    let answer = FilledColumn {
        header: "Delivery Date",
        label_col: customer,
        inputs: vec![(order_date, NumberStyle::Plain)],
        style: NumberStyle::Plain,
    }
    .derive(table, &mut b, |i| {
        let date = table
            .value(i, order_date)
            .as_date()
            .ok_or_else(|| not_a(table, i, order_date, "date"))?;
        Ok(Value::Date(add_days(date, DELIVERY_DAYS)?))
    });
    for entry in column_rows(&answer) {
        let (Some(delivered), Some(placed)) = (
            entry.1.as_date(),
            table.value(entry.0, order_date).as_date(),
        ) else {
            continue;
        };
        if (delivered.year(), delivered.month()) != (placed.year(), placed.month()) {
            b.step(format!(
                "Row {}: {} + {DELIVERY_DAYS} days rolls over into the next month: {}.",
                table.sheet_row(entry.0),
                format_value(&Value::Date(placed)),
                format_value(&Value::Date(delivered))
            ));
        }
    }
    out.push(b.finish(Ok(answer), resolved));

    // G: morning or afternoon
    let mut b = ExerciseBuilder::new("O2", "Morning or afternoon", result_cell(SHIFT_COL, first))
        .task("Label orders placed before noon Morning and the rest Afternoon.")
        .formula(format!(
            "=IF({}<TIME(12,0,0),\"Morning\",\"Afternoon\")",
            cell_of(order_time)
        ));
    let answer = FilledColumn {
        header: "Shift",
        label_col: customer,
        inputs: vec![(order_time, NumberStyle::Plain)],
        style: NumberStyle::Plain,
    }
    .derive(table, &mut b, |i| {
        let time = table
            .value(i, order_time)
            .as_time()
            .ok_or_else(|| not_a(table, i, order_time, "time"))?;
        let morning = compare_time(time, noon, TimeCutoff::Before);
        Ok(Value::text(if morning { "Morning" } else { "Afternoon" }))
    });
    for i in (0..table.len()).filter(|&i| table.value(i, order_time).as_time() == Some(noon)) {
        b.step(format!(
            "Row {} was placed at exactly 12:00, which is not before noon, so it is Afternoon.",
            table.sheet_row(i)
        ));
    }
    out.push(b.finish(Ok(answer), resolved));

    // H, I: text slices
    let name_ref = cell_of(customer);
    let mut b = ExerciseBuilder::new("O3", "Name prefix", result_cell(PREFIX_COL, first))
        .task(format!("Take the first {PREFIX_LEN} characters of each customer name."))
        .formula(format!("=LEFT({name_ref},{PREFIX_LEN})"));
    let answer = text_column(table, &mut b, "Prefix", order_id, customer, |s| {
        Ok(Value::text(left(s, PREFIX_LEN)))
    });
    out.push(b.finish(Ok(answer), resolved));

    let mut b = ExerciseBuilder::new("O4", "Name suffix", result_cell(SUFFIX_COL, first))
        .task(format!("Take the last {SUFFIX_LEN} characters of each customer name."))
        .formula(format!("=RIGHT({name_ref},{SUFFIX_LEN})"));
    let answer = text_column(table, &mut b, "Suffix", order_id, customer, |s| {
        Ok(Value::text(right(s, SUFFIX_LEN)))
    });
    for i in 0..table.len() {
        if let Some(name) = table.value(i, customer).as_text() {
            if name.chars().count() <= SUFFIX_LEN {
                b.step(format!(
                    "Row {}: \"{name}\" has no more than {SUFFIX_LEN} characters, so RIGHT returns the whole name.",
                    table.sheet_row(i)
                ));
            }
        }
    }
    out.push(b.finish(Ok(answer), resolved));

    // J: first name
    let mut b = ExerciseBuilder::new("O5", "First name", result_cell(FIRST_NAME_COL, first))
        .task("Take everything before the first space of each customer name.")
        .formula(format!("=LEFT({name_ref},FIND(\" \",{name_ref})-1)"));
    let answer = text_column(table, &mut b, "First Name", order_id, customer, |s| {
        let split = split_first_space(s);
        match split.rest {
            Some(_) => Ok(Value::text(split.first)),
            None => Err(RowFailure::new(
                CellError::Value,
                format!("\"{}\" has no space for FIND to locate", s.trim()),
            )),
        }
    });
    out.push(b.finish(Ok(answer), resolved));

    // K: discount
    let amount_ref = cell_of(amount);
    let at_least = Criterion::ge(DISCOUNT_THRESHOLD);
    let mut b = ExerciseBuilder::new("O6", "Discount", result_cell(DISCOUNT_COL, first))
        .task(format!(
            "Orders of {} or more get a {} discount; the rest get none.",
            NumberStyle::Currency.render(DISCOUNT_THRESHOLD),
            NumberStyle::Percent.render(DISCOUNT_RATE)
        ))
        .formula(format!(
            "=IF({amount_ref}>={},{amount_ref}*{},0)",
            format_plain(DISCOUNT_THRESHOLD),
            NumberStyle::Percent.render(DISCOUNT_RATE)
        ));
    let answer = FilledColumn {
        header: "Discount",
        label_col: customer,
        inputs: vec![(amount, NumberStyle::Currency)],
        style: NumberStyle::Currency,
    }
    .derive(table, &mut b, |i| {
        let value = table
            .value(i, amount)
            .as_number()
            .ok_or_else(|| RowFailure::not_a_number(table, i, amount))?;
        Ok(Value::Number(apply_rate_if(value, &at_least, DISCOUNT_RATE)))
    });
    out.push(b.finish(Ok(answer), resolved));

    // M: summary figures
    let at = |row| result_cell(SUMMARY_COL, row);
    out.push(customer_by_position(
        table,
        order_id,
        customer,
        ExerciseBuilder::new("O7", "Customer of order 7", at(2))
            .task("Use the order ID as a position to find who placed order 7."),
        resolved,
    ));
    out.push(
        AggregateSpec::new(Aggregate::Sum, amount)
            .filter(Predicate::new(order_date, Criterion::ge(revenue_from)))
            .ifs()
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("O8", "Revenue from 15 March", at(3))
                    .task("Add up the amounts of orders placed on or after 15 March 2024."),
                resolved,
            ),
    );
    out.push(
        AggregateSpec::new(Aggregate::Count, order_time)
            .filter(Predicate::new(order_time, Criterion::lt(noon)))
            .build(
                table,
                ExerciseBuilder::new("O9", "Orders before noon", at(4))
                    .task("Count the orders placed before 12:00."),
                resolved,
            ),
    );
    out.push(
        AggregateSpec::new(Aggregate::Average, amount)
            .style(NumberStyle::Currency)
            .build(
                table,
                ExerciseBuilder::new("O10", "Average order", at(5))
                    .task("Average the order amounts."),
                resolved,
            ),
    );

    Ok(out)
}

fn not_a(table: &Table, i: usize, col: ColumnId, what: &str) -> RowFailure {
    RowFailure::new(
        CellError::Value,
        format!(
            "{} is {}, not a {what}",
            table.header(col),
            format_value(table.value(i, col))
        ),
    )
}

/// Rows of a column answer as `(data index, value)`.
fn column_rows(answer: &Answer) -> Vec<(usize, Value)> {
    match answer {
        Answer::Column { rows, .. } => rows
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.value.clone()))
            .collect(),
        Answer::Scalar { .. } => Vec::new(),
    }
}

fn text_column<F>(
    table: &Table,
    b: &mut ExerciseBuilder,
    header: &str,
    label_col: ColumnId,
    source: ColumnId,
    f: F,
) -> Answer
where
    F: Fn(&str) -> Result<Value, RowFailure>,
{
    FilledColumn {
        header,
        label_col,
        inputs: vec![(source, NumberStyle::Plain)],
        style: NumberStyle::Plain,
    }
    .derive(table, b, |i| {
        let text = table
            .value(i, source)
            .as_text()
            .ok_or_else(|| not_a(table, i, source, "text"))?;
        f(text)
    })
}

fn customer_by_position(
    table: &Table,
    order_id: ColumnId,
    customer: ColumnId,
    builder: ExerciseBuilder,
    resolved: Option<&ResolvedSheet>,
) -> Exercise {
    let range = table.range_label(customer);
    let mut b = builder.formula(format!("=INDEX({range},{LOOKUP_ORDER_ID})"));
    b.step(format!(
        "Order IDs run 1, 2, 3, ... down the table, so order {LOOKUP_ORDER_ID} is position {LOOKUP_ORDER_ID} of {range}."
    ));
    let answer = index(table, customer, LOOKUP_ORDER_ID).map(|found| {
        let id = table.value(found.index, order_id);
        if id.as_number() != Some(LOOKUP_ORDER_ID as f64) {
            b.flag(format!(
                "Position {LOOKUP_ORDER_ID} holds order {}, so IDs and positions disagree.",
                format_value(id)
            ));
        }
        b.step(format!(
            "Position {LOOKUP_ORDER_ID} is sheet row {}: {}.",
            found.sheet_row,
            format_value(&found.value)
        ));
        Answer::scalar(found.value, NumberStyle::Plain)
    });
    b.finish(answer, resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ORDERS, table_from_sheet};
    use crate::storage::parse_csv_content;
    use std::path::Path;

    fn orders() -> Table {
        let csv = "Order ID,Customer Name,Order Date,Order Time,Order Amount\n\
            1,John Carter,2024-03-01,09:15,$150.00\n\
            2,Mary Jones,2024-03-30,12:00,$99.00\n\
            3,Cher,2024-03-31,17:55,$100.00\n";
        table_from_sheet(&ORDERS, &parse_csv_content(Path::new("o.csv"), csv)).unwrap()
    }

    fn column(ex: &Exercise) -> Vec<Value> {
        column_rows(ex.answer.as_ref().unwrap())
            .into_iter()
            .map(|(_, v)| v)
            .collect()
    }

    #[test]
    fn test_formulas() {
        let all = exercises(&orders(), None).unwrap();
        let formulas: Vec<&str> = all.iter().map(|e| e.formula.as_str()).collect();
        assert_eq!(
            formulas,
            vec![
                "=C2+3",
                "=IF(D2<TIME(12,0,0),\"Morning\",\"Afternoon\")",
                "=LEFT(B2,3)",
                "=RIGHT(B2,5)",
                "=LEFT(B2,FIND(\" \",B2)-1)",
                "=IF(E2>=100,E2*10%,0)",
                "=INDEX(B2:B4,7)",
                "=SUMIFS(E2:E4,C2:C4,\">=\"&DATE(2024,3,15))",
                "=COUNTIF(D2:D4,\"<\"&TIME(12,0,0))",
                "=AVERAGE(E2:E4)",
            ]
        );
    }

    #[test]
    fn test_dates_roll_into_april() {
        let all = exercises(&orders(), None).unwrap();
        let delivered: Vec<String> = column(&all[0]).iter().map(format_value).collect();
        assert_eq!(delivered, vec!["2024-03-04", "2024-04-02", "2024-04-03"]);
        assert!(all[0].steps.iter().any(|s| s.text.contains("rolls over")));
    }

    #[test]
    fn test_noon_is_afternoon() {
        let all = exercises(&orders(), None).unwrap();
        assert_eq!(
            column(&all[1]),
            vec![Value::text("Morning"), Value::text("Afternoon"), Value::text("Afternoon")]
        );
    }

    #[test]
    fn test_short_and_single_word_names() {
        let all = exercises(&orders(), None).unwrap();
        assert_eq!(column(&all[3])[2], Value::text("Cher"));
        assert_eq!(column(&all[2])[2], Value::text("Che"));
        let first = column(&all[4]);
        assert_eq!(first[0], Value::text("John"));
        assert_eq!(first[2], Value::Error(CellError::Value));
        assert!(all[4].is_ok());
    }

    #[test]
    fn test_discounts() {
        let all = exercises(&orders(), None).unwrap();
        assert_eq!(
            column(&all[5]),
            vec![Value::Number(15.0), Value::Number(0.0), Value::Number(10.0)]
        );
    }

    #[test]
    fn test_position_beyond_table_fails() {
        let all = exercises(&orders(), None).unwrap();
        assert!(matches!(
            all[6].answer,
            Err(QueryError::PositionOutOfRange { position: 7, len: 3 })
        ));
        assert_eq!(
            all[8].answer.as_ref().unwrap().first_value(),
            Some(&Value::Number(1.0))
        );
    }
}
