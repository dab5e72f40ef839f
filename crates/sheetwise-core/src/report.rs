//! Report assembly: every configured group loaded, replayed and checked.
//!
//! A report is rebuilt from disk each time it is shown. A group whose file
//! cannot be loaded becomes a failed section; the other groups still render.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sheetwise_engine::engine::{ParseIssue, Table};

use crate::config::{Config, DatasetPaths};
use crate::dataset::{ColumnKind, Group, load_table};
use crate::exercise::{CheckStatus, DisplayTable, Exercise, NumberStyle, exercises_for};
use crate::resolved::ResolvedSheet;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SectionStatus {
    Ready,
    Failed(String),
}

/// One dataset group as shown to the reader.
#[derive(Clone, Debug, Serialize)]
pub struct Section {
    pub group: Group,
    pub title: String,
    pub raw_path: PathBuf,
    pub resolved_path: Option<PathBuf>,
    /// The loaded table, formatted for display.
    pub preview: Option<DisplayTable>,
    pub issues: Vec<ParseIssue>,
    pub exercises: Vec<Exercise>,
    pub status: SectionStatus,
}

impl Section {
    pub fn is_ready(&self) -> bool {
        self.status == SectionStatus::Ready
    }

    fn failed(group: Group, paths: &DatasetPaths, reason: String) -> Section {
        Section {
            group,
            title: group.title().to_string(),
            raw_path: paths.raw.clone(),
            resolved_path: paths.resolved.clone(),
            preview: None,
            issues: Vec::new(),
            exercises: Vec::new(),
            status: SectionStatus::Failed(reason),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub sections: usize,
    pub failed_sections: usize,
    pub exercises: usize,
    pub failed_exercises: usize,
    pub matches: usize,
    pub differs: usize,
    pub unavailable: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

impl Report {
    /// Load and replay every configured group, in group order.
    pub fn build(config: &Config) -> Report {
        let sections = config
            .datasets
            .iter()
            .map(|(&group, paths)| build_section(group, paths))
            .collect();
        Report { sections }
    }

    pub fn section(&self, group: Group) -> Option<&Section> {
        self.sections.iter().find(|s| s.group == group)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            sections: self.sections.len(),
            ..Summary::default()
        };
        for section in &self.sections {
            if !section.is_ready() {
                summary.failed_sections += 1;
            }
            for exercise in &section.exercises {
                summary.exercises += 1;
                if !exercise.is_ok() {
                    summary.failed_exercises += 1;
                }
                match exercise.cross_check.status {
                    CheckStatus::Match => summary.matches += 1,
                    CheckStatus::FormulaDiffers | CheckStatus::ValueDiffers => {
                        summary.differs += 1
                    }
                    CheckStatus::Unavailable(_) => summary.unavailable += 1,
                }
            }
        }
        summary
    }

    /// True when a section failed or a cross-check disagrees.
    pub fn has_problems(&self) -> bool {
        let summary = self.summary();
        summary.failed_sections > 0 || summary.differs > 0
    }
}

fn build_section(group: Group, paths: &DatasetPaths) -> Section {
    let table = match load_table(group, &paths.raw) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(%group, path = %paths.raw.display(), error = %e, "cannot load dataset");
            return Section::failed(group, paths, e.to_string());
        }
    };

    let resolved = paths.resolved.as_deref().and_then(open_resolved);
    let exercises = match exercises_for(group, &table, resolved.as_ref()) {
        Ok(exercises) => exercises,
        Err(e) => {
            tracing::error!(%group, error = %e, "cannot replay exercises");
            return Section::failed(group, paths, e.to_string());
        }
    };

    tracing::info!(
        %group,
        rows = table.len(),
        issues = table.issues.len(),
        exercises = exercises.len(),
        "section loaded"
    );

    Section {
        group,
        title: group.title().to_string(),
        raw_path: paths.raw.clone(),
        resolved_path: paths.resolved.clone(),
        preview: Some(preview(group, &table)),
        issues: table.issues.clone(),
        exercises,
        status: SectionStatus::Ready,
    }
}

fn open_resolved(path: &Path) -> Option<ResolvedSheet> {
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "resolved file not found, cross-checks skipped");
        return None;
    }
    match ResolvedSheet::open(path) {
        Ok(sheet) => Some(sheet),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read resolved file");
            None
        }
    }
}

fn preview(group: Group, table: &Table) -> DisplayTable {
    let columns: Vec<_> = group
        .schema()
        .columns
        .iter()
        .filter_map(|spec| {
            let style = match spec.kind {
                ColumnKind::Currency => NumberStyle::Currency,
                ColumnKind::Fraction => NumberStyle::Percent,
                _ => NumberStyle::Plain,
            };
            table.column(spec.name).ok().map(|c| (c, style))
        })
        .collect();
    let rows: Vec<usize> = (0..table.len()).collect();
    DisplayTable::from_rows(table, &rows, &columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_fails_only_its_section() {
        let dir = std::env::temp_dir().join("sheetwise_report_missing");
        let mut config = Config::from_data_dir(&dir);
        config.retain_groups(&[Group::Sales, Group::Orders]);
        let report = Report::build(&config);
        assert_eq!(report.sections.len(), 2);
        for section in &report.sections {
            assert!(matches!(section.status, SectionStatus::Failed(_)));
            assert!(section.exercises.is_empty());
        }
        let summary = report.summary();
        assert_eq!(summary.failed_sections, 2);
        assert!(report.has_problems());
    }

    #[test]
    fn test_empty_config_has_no_problems() {
        let report = Report::build(&Config::default());
        assert!(report.sections.is_empty());
        assert!(!report.has_problems());
        assert_eq!(report.summary(), Summary::default());
    }
}
