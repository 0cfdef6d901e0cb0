use anyhow::{Context, Result};
use clap::Parser;

use advisory_geofilter::cli::Cli;
use advisory_geofilter::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(&cli)?;
    commands::init_logging(cli.verbose, &config.log);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(commands::run(&cli, &config))
}
