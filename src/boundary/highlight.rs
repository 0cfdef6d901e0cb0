use geo::Rect;

use crate::config::Config;
use crate::types::{Level, PlaceName};

/// Styling applied to a feature of the highlighted layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStyle {
    Selected,
    Dimmed,
}

/// One selected feature within a layer; every sibling is dimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub level: Level,
    pub selected: usize,
    /// Number of features in the highlighted layer
    pub features: usize,
    pub name: PlaceName,
    /// Viewport fit target
    pub bounds: Rect<f64>,
    /// Padding in pixels around `bounds`
    pub padding: u32,
}

impl Highlight {
    #[inline]
    pub fn style_of(&self, idx: usize) -> FeatureStyle {
        if idx == self.selected { FeatureStyle::Selected } else { FeatureStyle::Dimmed }
    }

    /// Style of every feature in the layer, by index.
    pub fn styles(&self) -> impl Iterator<Item = FeatureStyle> + '_ {
        (0..self.features).map(|idx| self.style_of(idx))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HighlightTarget {
    Feature(Highlight),
    /// No boundary matched at any level; show the whole country
    National,
}

/// Result of a highlight request, possibly resolved at a shallower level.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightOutcome {
    pub requested: Level,
    pub target: HighlightTarget,
}

impl HighlightOutcome {
    pub fn national(requested: Level) -> Self {
        Self { requested, target: HighlightTarget::National }
    }

    /// Level that was actually highlighted.
    pub fn level(&self) -> Level {
        match &self.target {
            HighlightTarget::Feature(h) => h.level,
            HighlightTarget::National => Level::National,
        }
    }

    /// True when the requested level had no match and a parent was used.
    #[inline]
    pub fn fell_back(&self) -> bool { self.level() != self.requested }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSettings {
    pub padding: [u32; 3],
    pub sample_names: usize,
}

impl HighlightSettings {
    pub fn from_config(config: &Config) -> Self {
        let padding = &config.map.padding;
        Self {
            padding: [padding.department, padding.province, padding.district],
            sample_names: config.diagnostics.sample_names,
        }
    }

    pub fn padding_for(&self, level: Level) -> u32 {
        match level.depth() {
            0 => 0,
            d => self.padding[d - 1],
        }
    }
}

impl Default for HighlightSettings {
    fn default() -> Self { Self::from_config(&Config::default()) }
}
