//! Server-side HTML for the dashboard. No scripts: tabs are plain links.

use sheetwise_core::{
    Answer, CheckStatus, Detail, DisplayTable, Exercise, Group, Report, Section, SectionStatus,
};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1d2330; }
header { background: #1d2330; color: #fff; padding: 12px 24px; }
nav { display: flex; gap: 4px; padding: 8px 24px; background: #e4e7ec; }
nav a { padding: 6px 12px; border-radius: 4px; color: #1d2330; text-decoration: none; }
nav a.active { background: #fff; font-weight: 600; }
nav a.failed { color: #b42318; }
.section { display: none; padding: 16px 24px; }
.section.active { display: block; }
.card { background: #fff; border-radius: 6px; padding: 12px 16px; margin-bottom: 12px; box-shadow: 0 1px 2px rgba(0,0,0,.08); }
code { background: #eef1f5; padding: 1px 4px; border-radius: 3px; }
table { border-collapse: collapse; margin: 6px 0; }
td, th { border: 1px solid #d0d5dd; padding: 2px 8px; text-align: left; }
.flagged { color: #b54708; }
.banner { padding: 6px 10px; border-radius: 4px; margin: 8px 0; }
.ok { background: #dcfae6; color: #085d3a; }
.err { background: #fee4e2; color: #912018; }
.check { font-size: 0.9em; color: #475467; }
.check.mismatch { color: #b54708; }
"#;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The whole dashboard; `active` is the section shown first.
pub fn render_page(report: &Report, active: Option<Group>) -> String {
    let summary = report.summary();
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Sheetwise</title>\
         <style>{STYLE}</style></head><body>\n<header><h1>Sheetwise</h1>\
         <p>{} exercises: {} match, {} differ, {} unavailable</p></header>\n<nav>",
        summary.exercises, summary.matches, summary.differs, summary.unavailable
    );
    for section in &report.sections {
        let mut class = Vec::new();
        if Some(section.group) == active {
            class.push("active");
        }
        if !section.is_ready() {
            class.push("failed");
        }
        let _ = write!(
            html,
            "<a href=\"/?tab={}\" class=\"{}\">{}</a>",
            section.group,
            class.join(" "),
            escape_html(&section.title)
        );
    }
    html.push_str("</nav>\n");
    for section in &report.sections {
        render_section(&mut html, section, Some(section.group) == active);
    }
    html.push_str("</body></html>\n");
    html
}

fn render_section(html: &mut String, section: &Section, active: bool) {
    let class = if active { "section active" } else { "section" };
    let _ = writeln!(
        html,
        "<section id=\"{}\" class=\"{class}\"><h2>{}</h2><p>Source: <code>{}</code></p>",
        section.group,
        escape_html(&section.title),
        escape_html(&section.raw_path.display().to_string())
    );
    if let SectionStatus::Failed(reason) = &section.status {
        let _ = writeln!(
            html,
            "<div class=\"banner err\">Could not load this dataset: {}</div></section>",
            escape_html(reason)
        );
        return;
    }
    if !section.issues.is_empty() {
        html.push_str("<div class=\"card\"><strong>Unreadable cells</strong><ul>");
        for issue in &section.issues {
            let _ = write!(
                html,
                "<li>Row {} {}: &quot;{}&quot; is not a {}</li>",
                issue.sheet_row,
                escape_html(&issue.column),
                escape_html(&issue.raw),
                escape_html(&issue.expected)
            );
        }
        html.push_str("</ul></div>\n");
    }
    for exercise in &section.exercises {
        render_exercise(html, exercise);
    }
    html.push_str("</section>\n");
}

fn render_exercise(html: &mut String, exercise: &Exercise) {
    let _ = write!(
        html,
        "<div class=\"card\"><h3>{}. {}</h3><p>{}</p>\
         <p>Formula in <code>{}</code>: <code>{}</code></p>",
        exercise.id,
        escape_html(&exercise.title),
        escape_html(&exercise.task),
        exercise.cell,
        escape_html(&exercise.formula)
    );

    let _ = write!(
        html,
        "<details><summary>{} steps</summary><ol>",
        exercise.steps.len()
    );
    for step in &exercise.steps {
        let class = if step.flagged { " class=\"flagged\"" } else { "" };
        let _ = write!(html, "<li{class}>{}", escape_html(&step.text));
        match &step.detail {
            Some(Detail::Table(table)) => render_table(html, table),
            Some(Detail::Pairs(pairs)) => {
                html.push_str("<table>");
                for (k, v) in pairs {
                    let _ = write!(
                        html,
                        "<tr><th>{}</th><td>{}</td></tr>",
                        escape_html(k),
                        escape_html(v)
                    );
                }
                html.push_str("</table>");
            }
            None => {}
        }
        html.push_str("</li>");
    }
    html.push_str("</ol></details>");

    match &exercise.answer {
        Ok(Answer::Scalar { display, .. }) => {
            let _ = write!(
                html,
                "<div class=\"banner ok\">Answer: <strong>{}</strong></div>",
                escape_html(display)
            );
        }
        Ok(Answer::Column { header, rows }) => {
            let table = DisplayTable {
                headers: vec!["Row".to_string(), "For".to_string(), header.clone()],
                rows: rows
                    .iter()
                    .map(|r| vec![r.sheet_row.to_string(), r.label.clone(), r.display.clone()])
                    .collect(),
            };
            html.push_str("<div class=\"banner ok\">Answer:");
            render_table(html, &table);
            html.push_str("</div>");
        }
        Err(_) => {
            let _ = write!(
                html,
                "<div class=\"banner err\">Error: {}</div>",
                escape_html(&exercise.answer_text())
            );
        }
    }

    let check = &exercise.cross_check;
    let class = if check.status.is_mismatch() {
        "check mismatch"
    } else {
        "check"
    };
    let detail = match &check.status {
        CheckStatus::Unavailable(reason) => escape_html(reason),
        _ => format!(
            "resolved sheet has <code>{}</code>",
            escape_html(&check.official_formula)
        ),
    };
    let _ = writeln!(
        html,
        "<p class=\"{class}\">Cross-check: {} ({detail})</p></div>",
        check.status.label()
    );
}

fn render_table(html: &mut String, table: &DisplayTable) {
    html.push_str("<table>");
    if !table.headers.is_empty() {
        html.push_str("<tr>");
        for h in &table.headers {
            let _ = write!(html, "<th>{}</th>", escape_html(h));
        }
        html.push_str("</tr>");
    }
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
}
