//! sheetwise - Terminal, browser and export frontends for the formula
//! exercises built by `sheetwise-core`.

pub mod args;
pub mod export;
pub mod logging;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "webui")]
pub mod webui;
