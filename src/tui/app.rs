//! Application state and logic.
//!
//! [`App`] owns the configuration and the report built from it. The report
//! is rebuilt from disk on reload; nothing else is cached.

use sheetwise_core::{Config, Exercise, Report, Section};

use super::clipboard::ClipboardProvider;

/// What the right-hand pane shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Exercise,
    Data,
}

pub struct App {
    pub config: Config,
    pub report: Report,
    /// Index into `report.sections`.
    pub tab: usize,
    /// Index into the current section's exercises.
    pub selected: usize,
    /// Whether the selected exercise's steps are shown.
    pub steps_expanded: bool,
    pub pane: Pane,
    /// Vertical scroll of the right-hand pane.
    pub detail_scroll: u16,
    pub help_modal: bool,
    pub help_scroll: usize,
    pub status_message: String,
    clipboard: Box<dyn ClipboardProvider>,
}

impl App {
    pub fn new(config: Config, clipboard: Box<dyn ClipboardProvider>) -> App {
        let report = Report::build(&config);
        let mut app = App {
            config,
            report,
            tab: 0,
            selected: 0,
            steps_expanded: false,
            pane: Pane::Exercise,
            detail_scroll: 0,
            help_modal: false,
            help_scroll: 0,
            status_message: String::new(),
            clipboard,
        };
        app.status_message = app.summary_message();
        app
    }

    /// Rebuild the report from disk, keeping the tab and selection when
    /// they still exist.
    pub fn reload(&mut self) {
        let group = self.current_section().map(|s| s.group);
        self.report = Report::build(&self.config);
        self.tab = group
            .and_then(|g| self.report.sections.iter().position(|s| s.group == g))
            .unwrap_or(0);
        let len = self.exercise_count();
        self.selected = self.selected.min(len.saturating_sub(1));
        self.detail_scroll = 0;
        self.status_message = format!("Reloaded. {}", self.summary_message());
        tracing::info!("report reloaded");
    }

    fn summary_message(&self) -> String {
        let s = self.report.summary();
        let mut msg = format!(
            "{} exercises: {} match, {} differ, {} unavailable",
            s.exercises, s.matches, s.differs, s.unavailable
        );
        if s.failed_sections > 0 {
            msg.push_str(&format!(", {} section(s) failed", s.failed_sections));
        }
        msg
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.report.sections.get(self.tab)
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.current_section()
            .and_then(|s| s.exercises.get(self.selected))
    }

    fn exercise_count(&self) -> usize {
        self.current_section().map_or(0, |s| s.exercises.len())
    }

    pub fn next_tab(&mut self) {
        let n = self.report.sections.len();
        if n > 0 {
            self.set_tab((self.tab + 1) % n);
        }
    }

    pub fn prev_tab(&mut self) {
        let n = self.report.sections.len();
        if n > 0 {
            self.set_tab((self.tab + n - 1) % n);
        }
    }

    pub fn set_tab(&mut self, tab: usize) {
        if tab < self.report.sections.len() && tab != self.tab {
            self.tab = tab;
            self.selected = 0;
            self.steps_expanded = false;
            self.detail_scroll = 0;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.exercise_count() {
            self.selected += 1;
            self.detail_scroll = 0;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.detail_scroll = 0;
        }
    }

    pub fn toggle_steps(&mut self) {
        self.steps_expanded = !self.steps_expanded;
    }

    pub fn toggle_data(&mut self) {
        self.pane = match self.pane {
            Pane::Exercise => Pane::Data,
            Pane::Data => Pane::Exercise,
        };
        self.detail_scroll = 0;
    }

    pub fn scroll_detail_by(&mut self, delta: i32) {
        let next = i32::from(self.detail_scroll).saturating_add(delta).max(0);
        self.detail_scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }

    /// Put the selected exercise's formula on the system clipboard.
    pub fn copy_formula(&mut self) {
        let Some(formula) = self.current_exercise().map(|e| e.formula.clone()) else {
            self.status_message = "Nothing to copy".to_string();
            return;
        };
        self.status_message = match self.clipboard.copy_text(&formula) {
            Ok(()) => format!("Copied {formula}"),
            Err(e) => format!("Error: clipboard unavailable ({e})"),
        };
    }

    pub fn open_help_modal(&mut self) {
        self.help_modal = true;
        self.help_scroll = 0;
    }

    pub fn close_help_modal(&mut self) {
        self.help_modal = false;
    }

    pub fn scroll_help_by(&mut self, delta: isize) {
        self.help_scroll = self.help_scroll.saturating_add_signed(delta);
    }
}
