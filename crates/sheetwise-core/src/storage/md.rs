//! Markdown export of a report.

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::exercise::{Answer, Detail, DisplayTable, Exercise};
use crate::report::{Report, SectionStatus};

/// Write the report to a markdown file.
pub fn write_markdown(path: &Path, report: &Report) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_report(&mut file, report)?;
    file.flush()?;
    tracing::info!(path = %path.display(), "markdown report written");
    Ok(())
}

pub fn render_markdown(report: &Report) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec does not fail.
    let _ = write_report(&mut buf, report);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_report<W: Write>(w: &mut W, report: &Report) -> std::io::Result<()> {
    let summary = report.summary();
    writeln!(w, "# Sheetwise report")?;
    writeln!(w)?;
    writeln!(
        w,
        "{} section(s), {} exercise(s). Cross-checks: {} match, {} differ, {} unavailable.",
        summary.sections, summary.exercises, summary.matches, summary.differs, summary.unavailable
    )?;

    for section in &report.sections {
        writeln!(w)?;
        writeln!(w, "## {}", escape_markdown(&section.title))?;
        writeln!(w)?;
        writeln!(w, "Source: `{}`", section.raw_path.display())?;
        if let SectionStatus::Failed(reason) = &section.status {
            writeln!(w)?;
            writeln!(w, "> **Failed:** {}", escape_markdown(reason))?;
            continue;
        }

        if !section.issues.is_empty() {
            writeln!(w)?;
            writeln!(w, "Cells that could not be read:")?;
            writeln!(w)?;
            for issue in &section.issues {
                writeln!(
                    w,
                    "- row {}, {}: `{}` is not a {}",
                    issue.sheet_row,
                    escape_markdown(&issue.column),
                    issue.raw,
                    issue.expected
                )?;
            }
        }

        for exercise in &section.exercises {
            writeln!(w)?;
            write_exercise(w, exercise)?;
        }
    }
    Ok(())
}

fn write_exercise<W: Write>(w: &mut W, exercise: &Exercise) -> std::io::Result<()> {
    writeln!(
        w,
        "### {}. {}",
        exercise.id,
        escape_markdown(&exercise.title)
    )?;
    writeln!(w)?;
    writeln!(w, "{}", escape_markdown(&exercise.task))?;
    writeln!(w)?;
    writeln!(w, "Formula in `{}`: `{}`", exercise.cell, exercise.formula)?;
    writeln!(w)?;

    for (n, step) in exercise.steps.iter().enumerate() {
        let marker = if step.flagged { "**Note:** " } else { "" };
        writeln!(w, "{}. {marker}{}", n + 1, escape_markdown(&step.text))?;
        match &step.detail {
            Some(Detail::Table(table)) => {
                writeln!(w)?;
                write_table(w, table)?;
                writeln!(w)?;
            }
            Some(Detail::Pairs(pairs)) => {
                let table = DisplayTable {
                    headers: vec!["Field".to_string(), "Value".to_string()],
                    rows: pairs.iter().map(|(k, v)| vec![k.clone(), v.clone()]).collect(),
                };
                writeln!(w)?;
                write_table(w, &table)?;
                writeln!(w)?;
            }
            None => {}
        }
    }
    if !exercise.steps.is_empty() {
        writeln!(w)?;
    }

    match &exercise.answer {
        Ok(Answer::Scalar { display, .. }) => {
            writeln!(w, "**Answer:** {}", escape_markdown(display))?;
        }
        Ok(Answer::Column { header, rows }) => {
            writeln!(w, "**Answer:** {}", escape_markdown(header))?;
            writeln!(w)?;
            let table = DisplayTable {
                headers: vec!["Row".to_string(), "For".to_string(), header.clone()],
                rows: rows
                    .iter()
                    .map(|r| vec![r.sheet_row.to_string(), r.label.clone(), r.display.clone()])
                    .collect(),
            };
            write_table(w, &table)?;
        }
        Err(e) => {
            writeln!(
                w,
                "**Error:** {} ({})",
                e.cell_error(),
                escape_markdown(&e.to_string())
            )?;
        }
    }
    writeln!(w)?;

    let check = &exercise.cross_check;
    if check.official_formula.is_empty() {
        writeln!(w, "Cross-check: {}", check.status.label())?;
    } else {
        writeln!(
            w,
            "Cross-check: {} (resolved sheet has `{}`)",
            check.status.label(),
            check.official_formula
        )?;
    }
    Ok(())
}

fn write_table<W: Write>(w: &mut W, table: &DisplayTable) -> std::io::Result<()> {
    write!(w, "|")?;
    for header in &table.headers {
        write!(w, " {} |", escape_markdown(header))?;
    }
    writeln!(w)?;
    write!(w, "|")?;
    for _ in &table.headers {
        write!(w, "---|")?;
    }
    writeln!(w)?;
    for row in &table.rows {
        write!(w, "|")?;
        for cell in row {
            write!(w, " {} |", escape_markdown(cell))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Group;
    use crate::exercise::{ExerciseBuilder, NumberStyle};
    use crate::report::Section;
    use sheetwise_engine::engine::{CellRef, QueryError, Value};
    use std::path::PathBuf;

    fn section(exercises: Vec<Exercise>, status: SectionStatus) -> Section {
        Section {
            group: Group::Sales,
            title: "Sales".to_string(),
            raw_path: PathBuf::from("data/sales.csv"),
            resolved_path: None,
            preview: None,
            issues: Vec::new(),
            exercises,
            status,
        }
    }

    fn exercise() -> Exercise {
        let mut b = ExerciseBuilder::new("S1", "Total | units", CellRef::new(7, 1))
            .task("Add up the units.")
            .formula("=SUM(C2:C3)");
        b.detail(
            "Values:",
            Detail::Table(DisplayTable {
                headers: vec!["Row".into(), "Units".into()],
                rows: vec![vec!["2".into(), "10".into()], vec!["3".into(), "5".into()]],
            }),
        );
        b.flag("Row 4 skipped.");
        b.finish(Ok(Answer::scalar(Value::Number(15.0), NumberStyle::Plain)), None)
    }

    #[test]
    fn test_render_exercise() {
        let report = Report {
            sections: vec![section(vec![exercise()], SectionStatus::Ready)],
        };
        let md = render_markdown(&report);
        assert!(md.starts_with("# Sheetwise report\n"));
        assert!(md.contains("## Sales\n"));
        assert!(md.contains("### S1. Total \\| units\n"));
        assert!(md.contains("Formula in `H2`: `=SUM(C2:C3)`"));
        assert!(md.contains("1. Values:\n\n| Row | Units |\n|---|---|\n| 2 | 10 |\n| 3 | 5 |\n"));
        assert!(md.contains("2. **Note:** Row 4 skipped."));
        assert!(md.contains("**Answer:** 15\n"));
        assert!(md.contains("Cross-check: unavailable"));
    }

    #[test]
    fn test_render_failed_section_and_error() {
        let failed = ExerciseBuilder::new("E1", "Lookup", CellRef::new(6, 1))
            .formula("=VLOOKUP(\"Zoe\",B2:D4,3,FALSE)")
            .finish(
                Err(QueryError::LookupNotFound {
                    column: "Name".into(),
                    key: "Zoe".into(),
                }),
                None,
            );
        let report = Report {
            sections: vec![
                section(vec![failed], SectionStatus::Ready),
                section(Vec::new(), SectionStatus::Failed("File not found: x.csv".into())),
            ],
        };
        let md = render_markdown(&report);
        assert!(md.contains("**Error:** #N/A (No row in Name matches Zoe)"));
        assert!(md.contains("> **Failed:** File not found: x.csv"));
    }

    #[test]
    fn test_write_markdown_file() {
        struct Cleanup(PathBuf);
        impl Drop for Cleanup {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
        let path = std::env::temp_dir().join(format!(
            "sheetwise_report_{}.md",
            std::process::id()
        ));
        let _cleanup = Cleanup(path.clone());
        let report = Report {
            sections: vec![section(vec![exercise()], SectionStatus::Ready)],
        };
        write_markdown(&path, &report).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_markdown(&report));
    }
}
