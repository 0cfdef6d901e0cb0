use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

use crate::types::{AdvisoryId, AdvisoryOrder, Severity};

/// Weather-advisory geo-filter CLI
#[derive(Parser, Debug)]
#[command(name = "geofilter", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the API base URL from the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List advisories
    Advisories(AdvisoriesArgs),

    /// Drill into an advisory by department, province and district
    Drill(DrillArgs),

    /// Cross-check aggregation names against boundary names (non-zero exit on mismatch)
    Validate(ValidateArgs),

    /// Generate hazard maps for an advisory; Ctrl-C cancels
    Generate(GenerateArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum ColorArg { Rojo, Naranja, Amarillo, Verde, Plomo }

impl From<ColorArg> for Severity {
    fn from(color: ColorArg) -> Self {
        match color {
            ColorArg::Rojo => Severity::Red,
            ColorArg::Naranja => Severity::Orange,
            ColorArg::Amarillo => Severity::Yellow,
            ColorArg::Verde => Severity::Green,
            ColorArg::Plomo => Severity::Grey,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, ValueEnum)]
pub enum OrderArg {
    /// Lowest advisory number first
    #[default]
    Recent,
    /// Highest advisory number first
    Oldest,
}

impl From<OrderArg> for AdvisoryOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Recent => AdvisoryOrder::Ascending,
            OrderArg::Oldest => AdvisoryOrder::Descending,
        }
    }
}

#[derive(Args, Debug)]
pub struct AdvisoriesArgs {
    /// Only advisories of this color
    #[arg(long, value_enum)]
    pub color: Option<ColorArg>,

    #[arg(long, value_enum, default_value_t)]
    pub order: OrderArg,
}

#[derive(Args, Debug)]
pub struct DrillArgs {
    pub advisory: AdvisoryId,

    #[arg(short, long)]
    pub department: Option<String>,

    /// Requires --department
    #[arg(short, long, requires = "department")]
    pub province: Option<String>,

    /// Requires --province
    #[arg(long, requires = "province")]
    pub district: Option<String>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    pub advisory: AdvisoryId,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    pub advisory: AdvisoryId,
}
