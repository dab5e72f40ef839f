use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io;

use super::app::App;
use super::ui;

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only process key press events (Windows reports Press + Release)
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, key) {
                return Ok(());
            }
        }
    }
}

/// Apply one key press. Returns true when the viewer should exit.
pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Help modal takes over input
    if app.help_modal {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => app.close_help_modal(),
            KeyCode::Down | KeyCode::Char('j') => app.scroll_help_by(1),
            KeyCode::Up | KeyCode::Char('k') => app.scroll_help_by(-1),
            KeyCode::PageDown => app.scroll_help_by(12),
            KeyCode::PageUp => app.scroll_help_by(-12),
            _ => {}
        }
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c'));
    }

    app.status_message.clear();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_tab(),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_tab(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(d) = c.to_digit(10) {
                app.set_tab(d as usize - 1);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::PageDown => app.scroll_detail_by(10),
        KeyCode::PageUp => app.scroll_detail_by(-10),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_steps(),
        KeyCode::Char('d') => app.toggle_data(),
        KeyCode::Char('y') => app.copy_formula(),
        KeyCode::Char('r') => app.reload(),
        KeyCode::Char('?') => app.open_help_modal(),
        _ => {}
    }
    false
}
