use std::sync::Arc;

use anyhow::Result;

use crate::api::HttpApi;
use crate::boundary::{FeatureStyle, Highlight, HighlightTarget};
use crate::cli::DrillArgs;
use crate::config::Config;
use crate::controller::GeoFilterController;
use crate::hazard::HazardLayer;
use crate::stats::ScopedStats;
use crate::types::{AdvisorySummary, Severity};
use crate::view::{DashboardView, NationalExtent, Placeholder, SelectorState};

/// Prints what a dashboard would render, one line per update.
#[derive(Debug, Default)]
pub struct ConsoleView {
    lines: Vec<String>,
}

impl ConsoleView {
    fn emit(&mut self, line: String) {
        eprintln!("{line}");
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] { &self.lines }
}

impl DashboardView for ConsoleView {
    fn render_selector(&mut self, selector: &SelectorState) {
        let line = match (selector.enabled, &selector.selected) {
            (false, _) if selector.placeholder == Placeholder::SelectParentFirst => {
                format!("[{}] select the parent level first", selector.level)
            }
            (false, _) => format!("[{}] disabled", selector.level),
            (true, Some(name)) => format!("[{}] {name} ({} options)", selector.level, selector.options.len()),
            (true, None) => format!("[{}] all ({} options)", selector.level, selector.options.len()),
        };
        self.emit(line);
    }

    fn render_stats(&mut self, stats: &ScopedStats) {
        let m = &stats.metrics;
        self.emit(format!(
            "{}: {} farmers, {:.2} ha, S/ {:.2}M insured",
            stats.title, m.farmers, m.hectares, m.insured_millions()
        ));
    }

    fn render_summary(&mut self, summary: &AdvisorySummary) {
        self.emit(format!(
            "advisory {}: {} critical, {} high risk, {} farmers, {:.2} ha, S/ {:.2}M insured",
            summary.color, summary.critical, summary.high_risk,
            summary.totals.farmers, summary.totals.hectares, summary.totals.insured_millions()
        ));
    }

    fn render_hazard_layer(&mut self, hazard: &HazardLayer) {
        let counts: Vec<String> = [Severity::Red, Severity::Orange, Severity::Yellow, Severity::Grey].into_iter()
            .filter(|s| hazard.count(*s) > 0)
            .map(|s| format!("{s} {}", hazard.count(s)))
            .collect();
        let day = hazard.critical_day.as_deref().unwrap_or("-");
        self.emit(format!("map: hazard layer {} zones [{}] day {day}", hazard.len(), counts.join(", ")));
    }

    fn apply_highlight(&mut self, highlight: &Highlight) {
        let b = highlight.bounds;
        let dimmed = highlight.styles().filter(|s| *s == FeatureStyle::Dimmed).count();
        self.emit(format!(
            "map: highlight {} {} ({dimmed} dimmed) fit [{:.4}, {:.4}] - [{:.4}, {:.4}] padding {}px",
            highlight.level, highlight.name, b.min().x, b.min().y, b.max().x, b.max().y, highlight.padding
        ));
    }

    fn reset_view(&mut self, extent: &NationalExtent) {
        self.emit(format!(
            "map: national view center [{}, {}] zoom {}",
            extent.center[0], extent.center[1], extent.zoom
        ));
    }
}

pub async fn run(config: &Config, args: &DrillArgs) -> Result<()> {
    let api = Arc::new(HttpApi::new(&config.api)?);
    let controller = GeoFilterController::new(api, ConsoleView::default(), config);

    controller.init().await;
    controller.select_advisory(args.advisory).await;

    if let Some(department) = &args.department {
        controller.set_department(Some(department.as_str())).await?;
    }
    if let Some(province) = &args.province {
        controller.set_province(Some(province.as_str())).await?;
    }
    if let Some(district) = &args.district {
        controller.set_district(Some(district.as_str())).await?;
    }

    println!("level:    {}", controller.level());
    if let Some(stats) = controller.stats() {
        println!("panel:    {}", stats.title);
        println!("farmers:  {}", stats.metrics.farmers);
        println!("hectares: {:.2}", stats.metrics.hectares);
        println!("insured:  {:.2}", stats.metrics.insured_amount);
    }
    match controller.highlight().map(|h| h.target) {
        Some(HighlightTarget::Feature(h)) => println!("map:      {} {}", h.level, h.name),
        Some(HighlightTarget::National) | None => println!("map:      national"),
    }
    Ok(())
}
