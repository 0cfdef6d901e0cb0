//! Subcommand implementations.

pub mod advisories;
pub mod drill;
pub mod generate;
pub mod validate;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::{Config, LogConfig};

/// Load the config file named on the command line and apply CLI overrides.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

/// Log to stderr. RUST_LOG wins, then -v/-vv, then the configured level.
pub fn init_logging(verbose: u8, log: &LogConfig) {
    let fallback = match verbose {
        0 => log.level.as_str(),
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub async fn run(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Advisories(args) => advisories::run(config, args).await,
        Commands::Drill(args) => drill::run(config, args).await,
        Commands::Validate(args) => validate::run(config, args).await,
        Commands::Generate(args) => generate::run(config, args).await,
    }
}
