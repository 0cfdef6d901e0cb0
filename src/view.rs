//! What the controller shows, and the trait through which it shows it.

use crate::aggregation::AggregationIndex;
use crate::boundary::Highlight;
use crate::config::MapConfig;
use crate::hazard::HazardLayer;
use crate::selection::Filters;
use crate::stats::ScopedStats;
use crate::types::{AdvisorySummary, Level, PlaceName};

/// Label of a selector's empty choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// "All": the selector is active and nothing is chosen
    All,
    /// The parent level must be chosen first
    SelectParentFirst,
}

/// Rendered state of one dependent selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorState {
    pub level: Level,
    pub options: Vec<PlaceName>,
    pub selected: Option<PlaceName>,
    pub enabled: bool,
    pub placeholder: Placeholder,
}

impl SelectorState {
    fn enabled(level: Level, options: Vec<PlaceName>, selected: Option<&PlaceName>) -> Self {
        Self { level, options, selected: selected.cloned(), enabled: true, placeholder: Placeholder::All }
    }

    fn disabled(level: Level, placeholder: Placeholder) -> Self {
        Self { level, options: Vec::new(), selected: None, enabled: false, placeholder }
    }
}

/// The three cascading selectors, derived from the filter and the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub department: SelectorState,
    pub province: SelectorState,
    pub district: SelectorState,
}

impl Selectors {
    /// A selector is populated only when its parent has a value; otherwise it
    /// is empty, disabled, and asks for the parent first.
    pub fn derive(advisory_loaded: bool, filters: &Filters, index: &AggregationIndex) -> Self {
        let department = if advisory_loaded {
            SelectorState::enabled(Level::Department, index.departments(), filters.department.as_ref())
        } else {
            SelectorState::disabled(Level::Department, Placeholder::All)
        };

        let province = match &filters.department {
            Some(dept) if advisory_loaded => {
                SelectorState::enabled(Level::Province, index.provinces(dept.as_str()), filters.province.as_ref())
            }
            _ => SelectorState::disabled(Level::Province, Placeholder::SelectParentFirst),
        };

        let district = match (&filters.department, &filters.province) {
            (Some(dept), Some(prov)) if advisory_loaded => {
                SelectorState::enabled(Level::District, index.districts(dept.as_str(), prov.as_str()), filters.district.as_ref())
            }
            _ => SelectorState::disabled(Level::District, Placeholder::SelectParentFirst),
        };

        Self { department, province, district }
    }

    pub fn get(&self, level: Level) -> Option<&SelectorState> {
        match level {
            Level::National => None,
            Level::Department => Some(&self.department),
            Level::Province => Some(&self.province),
            Level::District => Some(&self.district),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectorState> {
        [&self.department, &self.province, &self.district].into_iter()
    }
}

/// Viewport showing the whole country.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NationalExtent {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
}

impl NationalExtent {
    pub fn from_config(map: &MapConfig) -> Self {
        Self { center: map.national_center, zoom: map.national_zoom }
    }
}

/// Rendering surface driven by the controller: selectors, panels and the map.
pub trait DashboardView: Send {
    fn render_selector(&mut self, selector: &SelectorState);

    /// Dependent statistics panel
    fn render_stats(&mut self, stats: &ScopedStats);

    /// Whole-advisory KPI cards
    fn render_summary(&mut self, summary: &AdvisorySummary);

    /// Replace the advisory's risk overlay.
    fn render_hazard_layer(&mut self, hazard: &HazardLayer);

    /// Style the highlighted feature as selected, its siblings as dimmed, and
    /// fit the viewport to it.
    fn apply_highlight(&mut self, highlight: &Highlight);

    fn reset_view(&mut self, extent: &NationalExtent);
}
