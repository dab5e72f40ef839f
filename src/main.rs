//! Sheetwise - spreadsheet formula exercises in the terminal

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sheetwise::args::DataArgs;
use sheetwise::{export, logging};
use sheetwise_core::Report;
use sheetwise_core::storage::write_markdown;

/// Replay classroom spreadsheet formulas step by step and check them
/// against the resolved workbooks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    /// Export the report to a markdown file (non-interactive)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the report as JSON (non-interactive)
    #[arg(long, conflicts_with = "output")]
    json: bool,

    /// Print a cross-check summary; exit status 1 when a section fails or a formula differs
    #[arg(long, conflicts_with_all = ["output", "json"])]
    check: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let interactive = !(cli.check || cli.json || cli.output.is_some());
    let _guard = if interactive {
        logging::init_file(&cli.data.log_level)
    } else {
        logging::init_stderr(&cli.data.log_level);
        None
    };

    let config = cli.data.to_config()?;

    if cli.check {
        let report = Report::build(&config);
        for line in export::check_lines(&report) {
            println!("{line}");
        }
        return Ok(if report.has_problems() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    if cli.json {
        let report = Report::build(&config);
        println!("{}", export::to_json(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(output_path) = cli.output {
        let report = Report::build(&config);
        write_markdown(&output_path, &report)?;
        println!("Exported to {}", output_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    run_viewer(config)
}

#[cfg(feature = "tui")]
fn run_viewer(config: sheetwise_core::Config) -> anyhow::Result<ExitCode> {
    sheetwise::tui::run(config)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(not(feature = "tui"))]
fn run_viewer(_config: sheetwise_core::Config) -> anyhow::Result<ExitCode> {
    anyhow::bail!("built without the terminal viewer; use --output, --json or --check")
}
