use std::process::ExitCode;

use clap::Parser;
use geo_gateway::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            cli::serve::run().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Backfill(args) => cli::backfill::run(args).await,
    }
}
