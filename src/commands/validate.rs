use anyhow::{bail, Result};

use crate::api::HttpApi;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::validate::validate_advisory;

pub async fn run(config: &Config, args: &ValidateArgs) -> Result<()> {
    let api = HttpApi::new(&config.api)?;
    let report = validate_advisory(&api, args.advisory).await?;

    for (level, count) in &report.checked {
        eprintln!("checked {count} {level} names");
    }
    for mismatch in &report.mismatches {
        println!("{mismatch}");
    }

    if !report.is_clean() {
        bail!("{} aggregation names have no matching boundary", report.mismatches.len());
    }
    eprintln!("advisory {}: every aggregation name has a boundary", args.advisory);
    Ok(())
}
