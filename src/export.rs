//! Non-interactive output: JSON and the `--check` summary.

use sheetwise_core::{CheckStatus, Report, SectionStatus};

pub fn to_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// One line per section, then one line per exercise whose cross-check
/// disagrees, then the totals.
pub fn check_lines(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();
    for section in &report.sections {
        match &section.status {
            SectionStatus::Failed(reason) => {
                lines.push(format!("{}: FAILED ({reason})", section.group));
                continue;
            }
            SectionStatus::Ready => {}
        }
        let matches = section
            .exercises
            .iter()
            .filter(|e| e.cross_check.status == CheckStatus::Match)
            .count();
        lines.push(format!(
            "{}: {} exercises, {} match",
            section.group,
            section.exercises.len(),
            matches
        ));
        for exercise in &section.exercises {
            let check = &exercise.cross_check;
            if check.status.is_mismatch() {
                lines.push(format!(
                    "  {} {}: {} (computed {}, resolved {})",
                    exercise.id,
                    check.cell,
                    check.status.label(),
                    exercise.formula,
                    check.official_formula
                ));
            }
        }
    }
    let summary = report.summary();
    lines.push(format!(
        "{} exercises: {} match, {} differ, {} unavailable, {} failed section(s)",
        summary.exercises,
        summary.matches,
        summary.differs,
        summary.unavailable,
        summary.failed_sections
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetwise_core::{Config, Group};
    use std::path::Path;

    fn data_dir() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[test]
    fn test_check_lines_for_shipped_data() {
        let report = Report::build(&Config::from_data_dir(&data_dir()));
        let lines = check_lines(&report);
        assert_eq!(lines[0], "sales: 9 exercises, 9 match");
        assert_eq!(
            lines.last().unwrap(),
            "35 exercises: 35 match, 0 differ, 0 unavailable, 0 failed section(s)"
        );
    }

    #[test]
    fn test_check_lines_report_failures() {
        let mut config = Config::from_data_dir(Path::new("/nonexistent/sheetwise"));
        config.retain_groups(&[Group::Orders]);
        let lines = check_lines(&Report::build(&config));
        assert!(lines[0].starts_with("orders: FAILED (File not found"));
    }

    #[test]
    fn test_json_shape() {
        let mut config = Config::from_data_dir(&data_dir());
        config.retain_groups(&[Group::Employees]);
        let json = to_json(&Report::build(&config)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let section = &value["sections"][0];
        assert_eq!(section["group"], "employees");
        assert_eq!(section["status"]["state"], "ready");
        let first = &section["exercises"][0];
        assert_eq!(first["id"], "E1");
        assert_eq!(first["cell"], "G2");
        assert_eq!(first["cross_check"]["status"]["status"], "match");
    }
}
