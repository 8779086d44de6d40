//! `stashbox` command line uploader.

mod cli;
mod commands;
mod output;
mod timing;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser as _;
use stashbox_business::BusinessConfig;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    let config = BusinessConfig::new(cli.api_url);
    log::debug!("Using service at {}", config.api_base_url);

    match cli.command {
        Commands::Upload(args) => commands::run_upload(config, args).await,
        Commands::Completions { shell } => {
            commands::generate_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}
