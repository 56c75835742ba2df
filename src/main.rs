//! tradecfg - configuration tool for the trading engine
//!
//! Shows, validates and edits the layered trading configuration.

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradecfg::cli::Cli;
use tradecfg::config::{load_dotenv, report_dotenv, ProcessEnv};

fn main() {
    // .env values must be in place before clap and the sections read the environment
    let dotenv = load_dotenv();

    // Parse before logging so --debug can raise the log level
    let cli = Cli::parse();

    init_logging(cli.debug);
    report_dotenv(&dotenv);

    if let Err(e) = run(cli) {
        error!("Error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    info!("Starting tradecfg");

    cli.execute(&ProcessEnv)
        .context("configuration command failed")?;

    Ok(())
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "tradecfg=debug" } else { "tradecfg=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
