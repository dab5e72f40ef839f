//! UI rendering

use super::app::{App, Pane};
use super::help::{get_about_help, get_help_text};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
    },
};
use sheetwise_core::{Answer, CheckStatus, Detail, DisplayTable, Exercise, Section, SectionStatus};

pub(crate) const TAB_BAR_HEIGHT: u16 = 3;
pub(crate) const BODY_MIN_HEIGHT: u16 = 10;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const LIST_WIDTH_PERCENT: u16 = 32;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Min(BODY_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [tabs_area, body_area, status_area] = split_main_chunks(f.area());

    draw_tabs(f, app, tabs_area);
    match app.current_section() {
        Some(section) if matches!(section.status, SectionStatus::Failed(_)) => {
            draw_failed_section(f, section, body_area)
        }
        Some(section) => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(LIST_WIDTH_PERCENT),
                    Constraint::Percentage(100 - LIST_WIDTH_PERCENT),
                ])
                .split(body_area);
            draw_exercise_list(f, app, section, body[0]);
            match app.pane {
                Pane::Exercise => draw_exercise(f, app, body[1]),
                Pane::Data => draw_data(f, app, section, body[1]),
            }
        }
        None => {
            let paragraph = Paragraph::new("No dataset groups configured.")
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(paragraph, body_area);
        }
    }
    draw_status_bar(f, app, status_area);

    if app.help_modal {
        draw_help_modal(f, app);
    }
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app
        .report
        .sections
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let marker = if s.is_ready() { "" } else { " ✗" };
            Line::from(format!("{} {}{}", i + 1, s.title, marker))
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tab)
        .block(Block::default().borders(Borders::ALL).title(" Sheetwise "))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn draw_failed_section(f: &mut Frame, section: &Section, area: Rect) {
    let reason = match &section.status {
        SectionStatus::Failed(reason) => reason.as_str(),
        SectionStatus::Ready => "",
    };
    let lines = vec![
        Line::from(Span::styled(
            format!("{} could not be loaded", section.title),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(reason.to_string()),
        Line::from(""),
        Line::from(format!("Source: {}", section.raw_path.display())),
        Line::from("Fix the file and press r to reload."),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn status_marker(exercise: &Exercise) -> (&'static str, Color) {
    if !exercise.is_ok() {
        return ("✗", Color::Red);
    }
    match exercise.cross_check.status {
        CheckStatus::Match => ("✓", Color::Green),
        CheckStatus::FormulaDiffers | CheckStatus::ValueDiffers => ("≠", Color::Yellow),
        CheckStatus::Unavailable(_) => ("·", Color::DarkGray),
    }
}

fn draw_exercise_list(f: &mut Frame, app: &App, section: &Section, area: Rect) {
    let items: Vec<ListItem> = section
        .exercises
        .iter()
        .map(|e| {
            let (marker, color) = status_marker(e);
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker} "), Style::default().fg(color)),
                Span::raw(format!("{:<4}{}", e.id, e.title)),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Exercises "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_exercise(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let Some(exercise) = app.current_exercise() else {
        f.render_widget(Paragraph::new("No exercises.").block(block), area);
        return;
    };
    let block = block.title(format!(" {} {} ", exercise.id, exercise.title));
    let paragraph = Paragraph::new(exercise_lines(exercise, app.steps_expanded))
        .block(block)
        .scroll((app.detail_scroll, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub(crate) fn exercise_lines(exercise: &Exercise, expanded: bool) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(exercise.task.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{}  ", exercise.cell), heading),
            Span::styled(exercise.formula.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
    ];

    if expanded {
        lines.push(Line::from(Span::styled("Steps", heading)));
        for (n, step) in exercise.steps.iter().enumerate() {
            let style = if step.flagged {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{:>2}. {}", n + 1, step.text),
                style,
            )));
            let table = match &step.detail {
                Some(Detail::Table(table)) => Some(table.clone()),
                Some(Detail::Pairs(pairs)) => Some(DisplayTable {
                    headers: Vec::new(),
                    rows: pairs.iter().map(|(k, v)| vec![k.clone(), v.clone()]).collect(),
                }),
                None => None,
            };
            if let Some(table) = table {
                for row in table_lines(&table) {
                    lines.push(Line::from(Span::styled(
                        format!("      {row}"),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }
    } else {
        lines.push(Line::from(Span::styled(
            format!("{} step(s) hidden, press Enter to show", exercise.steps.len()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));

    match &exercise.answer {
        Ok(Answer::Scalar { display, .. }) => lines.push(Line::from(Span::styled(
            format!("Answer: {display}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))),
        Ok(answer @ Answer::Column { rows, .. }) => {
            lines.push(Line::from(Span::styled(
                format!("Answer: {}", answer.summary()),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            for row in rows {
                let style = if row.value.is_error() {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("  row {:<3} {:<16} {}", row.sheet_row, row.label, row.display),
                    style,
                )));
            }
        }
        Err(_) => lines.push(Line::from(Span::styled(
            format!("Error: {}", exercise.answer_text()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))),
    }

    let check = &exercise.cross_check;
    let (_, color) = status_marker(exercise);
    let text = match &check.status {
        CheckStatus::Unavailable(reason) => format!("Cross-check: unavailable ({reason})"),
        status => format!(
            "Cross-check: {} (resolved {})",
            status.label(),
            check.official_formula
        ),
    };
    lines.push(Line::from(Span::styled(text, Style::default().fg(color))));
    lines
}

/// Column-aligned text rows, header first when there is one.
pub(crate) fn table_lines(table: &DisplayTable) -> Vec<String> {
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(&table.headers).chain(&table.rows) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let render = |row: &Vec<String>| {
        row.iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out = Vec::new();
    if !table.headers.is_empty() {
        out.push(render(&table.headers));
    }
    out.extend(table.rows.iter().map(render));
    out
}

fn draw_data(f: &mut Frame, app: &App, section: &Section, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", section.raw_path.display()));
    let Some(preview) = &section.preview else {
        f.render_widget(Paragraph::new("No data loaded.").block(block), area);
        return;
    };

    let issue_lines = section.issues.len().min(6) as u16 + u16::from(!section.issues.is_empty());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(issue_lines)])
        .split(area);

    let mut widths: Vec<u16> = preview.headers.iter().map(|h| h.chars().count() as u16).collect();
    for row in &preview.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count() as u16);
            }
        }
    }
    let header = Row::new(preview.headers.iter().map(|h| Cell::from(h.clone())))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows = preview
        .rows
        .iter()
        .skip(usize::from(app.detail_scroll))
        .map(|r| Row::new(r.iter().map(|c| Cell::from(c.clone()))));
    let table = Table::new(rows, widths.into_iter().map(Constraint::Length))
        .header(header)
        .block(block)
        .column_spacing(2);
    f.render_widget(table, chunks[0]);

    if !section.issues.is_empty() {
        let lines: Vec<Line> = section
            .issues
            .iter()
            .map(|i| {
                Line::from(Span::styled(
                    format!(
                        "row {} {}: \"{}\" is not a {}",
                        i.sheet_row, i.column, i.raw, i.expected
                    ),
                    Style::default().fg(Color::Yellow),
                ))
            })
            .collect();
        f.render_widget(Paragraph::new(lines), chunks[1]);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status = if app.status_message.is_empty() {
        "Tab: dataset  j/k: exercise  Enter: steps  y: copy  r: reload  ?: help  q: quit"
            .to_string()
    } else {
        app.status_message.clone()
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(status, style)]));
    f.render_widget(paragraph, area);
}

fn draw_help_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 70, f.area());

    let modal_style = Style::default().fg(Color::White).bg(Color::Black);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" About Sheetwise ")
        .border_style(Style::default().fg(Color::Green))
        .style(modal_style);

    let mut lines: Vec<Line> = Vec::new();
    for text in get_about_help().into_iter().chain([String::new()]).chain(get_help_text()) {
        let style = if text == "About Sheetwise" {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if text.starts_with("  ") || !text.ends_with(':') {
            Style::default().fg(Color::White)
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let viewport_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(viewport_height);
    let effective_scroll = app.help_scroll.min(max_scroll);
    let scroll_y = u16::try_from(effective_scroll).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(modal_style)
        .scroll((scroll_y, 0))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::ClipboardProvider;
    use ratatui::{Terminal, backend::TestBackend};
    use sheetwise_core::Config;
    use std::path::Path;

    struct NoClipboard;

    impl ClipboardProvider for NoClipboard {
        fn copy_text(&mut self, _text: &str) -> Result<(), String> {
            Err("no display".to_string())
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn app() -> App {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        App::new(Config::from_data_dir(&dir), Box::new(NoClipboard))
    }

    #[test]
    fn test_table_lines_align_columns() {
        let table = DisplayTable {
            headers: vec!["Row".into(), "Units".into()],
            rows: vec![vec!["2".into(), "10".into()], vec!["10".into(), "5".into()]],
        };
        assert_eq!(table_lines(&table), vec!["Row  Units", "2    10", "10   5"]);
    }

    #[test]
    fn test_steps_collapsed_by_default() {
        let app = app();
        let exercise = app.current_exercise().unwrap();
        let collapsed: Vec<String> = exercise_lines(exercise, false)
            .iter()
            .map(line_text)
            .collect();
        assert!(collapsed.iter().any(|l| l.contains("press Enter to show")));
        assert!(collapsed.iter().any(|l| l == "H2  =SUM(C2:C11)"));
        assert!(collapsed.iter().any(|l| l == "Answer: 150"));

        let expanded: Vec<String> = exercise_lines(exercise, true).iter().map(line_text).collect();
        assert!(expanded.iter().any(|l| l.starts_with(" 1. ")));
        assert!(expanded.iter().any(|l| l.starts_with("Cross-check: match")));
    }

    #[test]
    fn test_draw_renders_without_panicking() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        app.toggle_data();
        app.open_help_modal();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
    }
}
