//! sheetwise-core - Dataset loading, formula exercises and reports.

pub mod config;
pub mod dataset;
pub mod error;
pub mod exercise;
pub mod report;
pub mod resolved;
pub mod storage;

pub use config::{Config, DatasetPaths};
pub use dataset::{ColumnKind, Group, Schema, load_table};
pub use error::{Result, SheetwiseError};
pub use exercise::{
    Answer, CheckStatus, CrossCheck, Detail, DisplayTable, Exercise, NumberStyle, Step,
    exercises_for,
};
pub use report::{Report, Section, SectionStatus, Summary};
pub use resolved::ResolvedSheet;

pub use sheetwise_engine::engine::{CellRef, QueryError, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use sheetwise_engine::engine::{CellError, format_value};
    use std::path::{Path, PathBuf};

    fn data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn shipped_report() -> Report {
        Report::build(&Config::from_data_dir(&data_dir()))
    }

    fn exercise<'a>(report: &'a Report, group: Group, id: &str) -> &'a Exercise {
        report
            .section(group)
            .and_then(|s| s.exercises.iter().find(|e| e.id == id))
            .unwrap_or_else(|| panic!("no exercise {id} in {group}"))
    }

    fn number(report: &Report, group: Group, id: &str) -> f64 {
        let ex = exercise(report, group, id);
        ex.answer
            .as_ref()
            .unwrap()
            .first_value()
            .and_then(Value::as_number)
            .unwrap_or_else(|| panic!("{id} is not a number"))
    }

    fn text(report: &Report, group: Group, id: &str) -> String {
        let ex = exercise(report, group, id);
        format_value(ex.answer.as_ref().unwrap().first_value().unwrap())
    }

    fn column(report: &Report, group: Group, id: &str) -> Vec<Value> {
        match exercise(report, group, id).answer.as_ref().unwrap() {
            Answer::Column { rows, .. } => rows.iter().map(|r| r.value.clone()).collect(),
            other => panic!("{id}: expected a column, got {other:?}"),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_shipped_data_loads_and_cross_checks() {
        let report = shipped_report();
        assert_eq!(report.sections.len(), 4);
        for section in &report.sections {
            assert!(section.is_ready(), "{}: {:?}", section.title, section.status);
            assert!(section.issues.is_empty(), "{}: {:?}", section.title, section.issues);
            for ex in &section.exercises {
                assert!(ex.is_ok(), "{}: {}", ex.id, ex.answer_text());
                assert_eq!(
                    ex.cross_check.status,
                    CheckStatus::Match,
                    "{} in {}: ours {}, resolved {}",
                    ex.id,
                    ex.cross_check.cell,
                    ex.formula,
                    ex.cross_check.official_formula
                );
            }
        }
        let summary = report.summary();
        assert_eq!(summary.exercises, 35);
        assert_eq!(summary.matches, 35);
        assert!(!report.has_problems());
    }

    #[test]
    fn test_sales_answers() {
        let r = shipped_report();
        assert_close(number(&r, Group::Sales, "S1"), 150.0);
        assert_close(number(&r, Group::Sales, "S2"), 24.124);
        assert_close(number(&r, Group::Sales, "S3"), 30.0);
        assert_close(number(&r, Group::Sales, "S4"), 5.0);
        assert_close(number(&r, Group::Sales, "S5"), 3.0);
        assert_close(number(&r, Group::Sales, "S6"), 45.0);
        assert_close(number(&r, Group::Sales, "S7"), 4.0);
        assert_close(number(&r, Group::Sales, "S8"), 3164.75);
        assert_eq!(text(&r, Group::Sales, "S9"), "2024-01-13");
    }

    #[test]
    fn test_employee_answers() {
        let r = shipped_report();
        assert_close(number(&r, Group::Employees, "E1"), 72000.0);
        assert_eq!(text(&r, Group::Employees, "E2"), "Finance");
        assert_eq!(text(&r, Group::Employees, "E3"), "E007");
        assert_eq!(text(&r, Group::Employees, "E4"), "Finance");
        assert_close(number(&r, Group::Employees, "E5"), 199000.0 / 3.0);
        assert_close(number(&r, Group::Employees, "E6"), 3.0);
        assert_eq!(text(&r, Group::Employees, "E7"), "Frank Miller");
        assert_close(number(&r, Group::Employees, "E8"), 617000.0);
    }

    #[test]
    fn test_xlookup_prefix_is_stripped_for_display() {
        let r = shipped_report();
        let check = &exercise(&r, Group::Employees, "E4").cross_check;
        assert_eq!(
            check.official_formula,
            "=XLOOKUP(\"Irene Clark\",B2:B11,C2:C11)"
        );
    }

    #[test]
    fn test_bonus_answers() {
        let r = shipped_report();
        assert_close(number(&r, Group::Bonus, "B1"), 72000.0);
        assert_close(number(&r, Group::Bonus, "B2"), 2.0);
        assert_close(number(&r, Group::Bonus, "B3"), 70250.0);
        assert_close(number(&r, Group::Bonus, "B4"), 52000.0);
        assert_close(number(&r, Group::Bonus, "B5"), 52000.0);

        let amounts = column(&r, Group::Bonus, "B6");
        assert_close(amounts[0].as_number().unwrap(), 2750.0);

        // Irene Clark has a 0% bonus
        let recovered = column(&r, Group::Bonus, "B7");
        assert_eq!(recovered[8], Value::Error(CellError::DivZero));
        assert_close(recovered[0].as_number().unwrap(), 55000.0);

        let bands = column(&r, Group::Bonus, "B8");
        let high = bands.iter().filter(|v| **v == Value::text("High")).count();
        assert_eq!(high, 6);
        // Jack Taylor earns exactly the threshold
        assert_eq!(bands[9], Value::text("High"));
    }

    #[test]
    fn test_order_answers() {
        let r = shipped_report();
        assert_eq!(text(&r, Group::Orders, "O7"), "Ava Thompson");
        assert_close(number(&r, Group::Orders, "O8"), 831.74);
        assert_close(number(&r, Group::Orders, "O9"), 5.0);
        assert_close(number(&r, Group::Orders, "O10"), 138.649);

        let delivered = column(&r, Group::Orders, "O1");
        assert_eq!(format_value(&delivered[8]), "2024-04-03");
        let shifts = column(&r, Group::Orders, "O2");
        assert_eq!(shifts[5], Value::text("Afternoon"));
        let suffixes = column(&r, Group::Orders, "O4");
        assert_eq!(suffixes[9], Value::text("Cher"));
        let first_names = column(&r, Group::Orders, "O5");
        assert_eq!(first_names[0], Value::text("John"));
        assert_eq!(first_names[9], Value::Error(CellError::Value));
        let discounts = column(&r, Group::Orders, "O6");
        assert_close(discounts[0].as_number().unwrap(), 15.0);
        assert_close(discounts[1].as_number().unwrap(), 0.0);
        assert_close(discounts[4].as_number().unwrap(), 10.0);
    }

    #[test]
    fn test_missing_raw_file_only_fails_its_section() {
        let mut config = Config::from_data_dir(&data_dir());
        config.datasets.insert(
            Group::Sales,
            DatasetPaths {
                raw: data_dir().join("no_such_sales.csv"),
                resolved: None,
            },
        );
        let report = Report::build(&config);
        let sales = report.section(Group::Sales).unwrap();
        match &sales.status {
            SectionStatus::Failed(reason) => assert!(reason.contains("not found"), "{reason}"),
            other => panic!("expected failure, got {other:?}"),
        }
        for group in [Group::Employees, Group::Bonus, Group::Orders] {
            assert!(report.section(group).unwrap().is_ready());
        }
        assert_eq!(report.summary().failed_sections, 1);
        assert!(report.has_problems());
    }

    #[test]
    fn test_missing_resolved_file_marks_checks_unavailable() {
        let mut config = Config::from_data_dir(&data_dir());
        config.retain_groups(&[Group::Employees]);
        if let Some(paths) = config.datasets.get_mut(&Group::Employees) {
            paths.resolved = Some(data_dir().join("no_such_resolved.csv"));
        }
        let report = Report::build(&config);
        let section = report.section(Group::Employees).unwrap();
        assert!(section.is_ready());
        assert!(section
            .exercises
            .iter()
            .all(|e| matches!(e.cross_check.status, CheckStatus::Unavailable(_))));
        assert!(!report.has_problems());
    }

    #[test]
    fn test_unreadable_cell_is_reported_not_zeroed() {
        let mut config = Config::default();
        config.datasets.insert(
            Group::Sales,
            DatasetPaths {
                raw: fixture("sales_bad_units.csv"),
                resolved: None,
            },
        );
        let report = Report::build(&config);
        let sales = report.section(Group::Sales).unwrap();
        assert_eq!(sales.issues.len(), 1);
        assert_eq!(sales.issues[0].sheet_row, 3);
        assert_eq!(sales.issues[0].raw, "ten");

        let total = exercise(&report, Group::Sales, "S1");
        assert_close(number(&report, Group::Sales, "S1"), 30.0);
        assert!(total.steps.iter().any(|s| s.flagged && s.text.contains("Row 3")));
        // MIN must not see a zero
        assert_close(number(&report, Group::Sales, "S4"), 10.0);
    }

    #[test]
    fn test_short_header_is_a_schema_failure() {
        let err = load_table(Group::Sales, &fixture("sales_two_columns.csv")).unwrap_err();
        assert!(matches!(
            err,
            SheetwiseError::Schema {
                expected: 4,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_markdown_covers_every_section() {
        let md = storage::render_markdown(&shipped_report());
        for title in ["## Sales", "## Employees", "## Employee Bonus", "## Orders"] {
            assert!(md.contains(title), "{title}");
        }
        assert!(md.contains("### S8. Total revenue"));
        assert!(md.contains("**Answer:** $3,164.75"));
    }
}
