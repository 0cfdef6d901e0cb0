use anyhow::Result;

use crate::api::{DashboardApi, HttpApi};
use crate::cli::AdvisoriesArgs;
use crate::config::Config;
use crate::types::{filter_advisories, Advisory};

pub async fn run(config: &Config, args: &AdvisoriesArgs) -> Result<()> {
    let api = HttpApi::new(&config.api)?;
    let advisories = api.advisories().await?;
    let shown = filter_advisories(&advisories, args.color.map(Into::into), args.order.into());

    for advisory in &shown {
        println!("{}", format_row(advisory));
    }
    eprintln!("{} of {} advisories", shown.len(), advisories.len());
    Ok(())
}

/// `*` marks advisories eligible for map generation.
fn format_row(advisory: &Advisory) -> String {
    let mark = if advisory.color.allows_map_generation() { '*' } else { ' ' };
    format!("{:>5} {mark} {:<8} {}", advisory.id, advisory.color.to_str(), advisory.title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn rows_mark_map_eligible_advisories() {
        let red = Advisory { id: 412, color: Severity::Red, title: "Lluvias".into() };
        let yellow = Advisory { id: 9, color: Severity::Yellow, title: "Heladas".into() };
        assert_eq!(format_row(&red), "  412 * rojo     Lluvias");
        assert_eq!(format_row(&yellow), "    9   amarillo Heladas");
    }
}
