//! Terminal viewer: one tab per dataset group, the exercise list on the
//! left and the selected exercise's derivation on the right.

mod app;
mod clipboard;
mod help;
mod input;
mod ui;

pub use app::{App, Pane};
pub use clipboard::{ClipboardProvider, SystemClipboard};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use sheetwise_core::Config;
use std::io;

/// Open the viewer on the alternate screen until the user quits.
pub fn run(config: Config) -> io::Result<()> {
    let mut app = App::new(config, Box::new(SystemClipboard::default()));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = input::run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}
