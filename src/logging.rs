//! Tracing setup shared by the binaries.
//!
//! `RUST_LOG` wins over the `--log-level` flag. The terminal viewer logs to a
//! daily file so events never land on the screen it is drawing.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_PREFIX: &str = "sheetwise.log";

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr. Calling it twice is harmless.
pub fn init_stderr(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter(level))
        .try_init();
}

/// Log to `<data dir>/logs/sheetwise.log.<date>`. The returned guard must be
/// held until exit so buffered lines are flushed.
pub fn init_file(level: &str) -> Option<WorkerGuard> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter(level))
        .try_init()
        .ok()?;
    Some(guard)
}

pub fn log_dir() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetwise")?;
    Some(proj.data_local_dir().join("logs"))
}
