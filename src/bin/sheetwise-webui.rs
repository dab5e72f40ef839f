//! sheetwise-webui - the exercise report as a browser dashboard.

use std::net::SocketAddr;

use clap::Parser;
use sheetwise::args::DataArgs;
use sheetwise::logging;

/// Serve the formula exercises over HTTP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_stderr(&cli.data.log_level);

    let config = cli.data.to_config()?;
    sheetwise::webui::run_server(cli.addr, config).await
}
