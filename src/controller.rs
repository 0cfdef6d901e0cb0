//! The geo-filter controller: selection transitions and their side effects.
//!
//! Every transition mutates the [`Selection`] synchronously, then runs the
//! sync procedure in a fixed order: rebuild the cascading selectors, fetch
//! scoped statistics, update the map highlight. Transitions take `&self` and
//! may interleave at await points; each one issues a [`RequestToken`] and any
//! response that arrives after a newer transition began is discarded.

use std::sync::Arc;

use anyhow::Result;
use geo::Point;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::aggregation::AggregationIndex;
use crate::api::{fetch_scoped_stats, fetch_summary, load_aggregations, load_hazard_layer, DashboardApi};
use crate::boundary::{BoundaryCache, HighlightOutcome, HighlightSettings, HighlightTarget};
use crate::config::Config;
use crate::error::FilterResult;
use crate::hazard::HazardLayer;
use crate::selection::{Filters, Selection, Transition};
use crate::stats::{panel_title, RequestToken, ScopedQuery, ScopedStats, TokenGate};
use crate::types::{Advisory, AdvisoryId, AdvisorySummary, Level, Metrics, PlaceName};
use crate::view::{DashboardView, NationalExtent, Selectors};

/// Hover description of the boundary under a point.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub level: Level,
    pub name: PlaceName,
    /// Metrics for the feature under the current advisory, if indexed
    pub metrics: Option<Metrics>,
}

pub struct GeoFilterController<A: DashboardApi + ?Sized, V: DashboardView> {
    api: Arc<A>,
    view: Mutex<V>,
    extent: NationalExtent,
    boundaries: BoundaryCache,
    selection: Mutex<Selection>,
    index: Mutex<Arc<AggregationIndex>>,
    summary: Mutex<Option<AdvisorySummary>>,
    hazard: Mutex<Arc<HazardLayer>>,
    panel: Mutex<Option<ScopedStats>>,
    highlight: Mutex<Option<HighlightOutcome>>,
    tokens: TokenGate,
}

impl<A: DashboardApi + ?Sized, V: DashboardView> GeoFilterController<A, V> {
    pub fn new(api: Arc<A>, view: V, config: &Config) -> Self {
        Self {
            api,
            view: Mutex::new(view),
            extent: NationalExtent::from_config(&config.map),
            boundaries: BoundaryCache::new(HighlightSettings::from_config(config)),
            selection: Mutex::new(Selection::new()),
            index: Mutex::new(Arc::new(AggregationIndex::empty())),
            summary: Mutex::new(None),
            hazard: Mutex::new(Arc::new(HazardLayer::empty())),
            panel: Mutex::new(None),
            highlight: Mutex::new(None),
            tokens: TokenGate::new(),
        }
    }

    /// Load department and province boundaries and show the national view
    /// with every selector disabled.
    pub async fn init(&self) {
        self.boundaries.load_eager(self.api.as_ref()).await;
        self.render_selectors(&Selectors::derive(false, &Filters::default(), &AggregationIndex::empty()));
        self.view.lock().reset_view(&self.extent);
        info!("geo-filter controller initialized");
    }

    pub async fn advisories(&self) -> Result<Vec<Advisory>> {
        self.api.advisories().await
    }

    /// Switch advisories: reset the filter to national, replace the
    /// aggregation index, the summary KPIs and the hazard overlay, then sync.
    pub async fn select_advisory(&self, advisory: AdvisoryId) {
        self.tokens.issue();
        self.selection.lock().begin_advisory(advisory);
        *self.index.lock() = Arc::new(AggregationIndex::empty());
        *self.hazard.lock() = Arc::new(HazardLayer::empty());
        info!(advisory, "advisory selected");

        let index = load_aggregations(self.api.as_ref(), advisory).await;
        if self.selection.lock().advisory() != Some(advisory) {
            debug!(advisory, "discarding aggregation index for superseded advisory");
            return;
        }
        *self.index.lock() = Arc::new(index);

        let summary = fetch_summary(self.api.as_ref(), advisory).await;
        if self.selection.lock().advisory() != Some(advisory) {
            debug!(advisory, "discarding summary for superseded advisory");
            return;
        }
        *self.summary.lock() = Some(summary);
        self.view.lock().render_summary(&summary);

        let hazard = Arc::new(load_hazard_layer(self.api.as_ref(), advisory).await);
        if self.selection.lock().advisory() != Some(advisory) {
            debug!(advisory, "discarding hazard layer for superseded advisory");
            return;
        }
        *self.hazard.lock() = hazard.clone();
        self.view.lock().render_hazard_layer(&hazard);

        // Anything issued before the index arrived synced against an empty one.
        self.sync(self.tokens.issue()).await;
    }

    /// Set (`Some`) or clear (`None`) the department filter. Returns the
    /// resulting level.
    pub async fn set_department(&self, name: Option<&str>) -> FilterResult<Level> {
        self.transition(Level::Department, name).await
    }

    pub async fn set_province(&self, name: Option<&str>) -> FilterResult<Level> {
        self.transition(Level::Province, name).await
    }

    pub async fn set_district(&self, name: Option<&str>) -> FilterResult<Level> {
        self.transition(Level::District, name).await
    }

    /// Reset to national, keeping the advisory.
    pub async fn clear_filters(&self) -> Level {
        let token = {
            let mut selection = self.selection.lock();
            selection.clear_all();
            self.tokens.issue()
        };
        info!("filters cleared");
        self.sync(token).await;
        Level::National
    }

    async fn transition(&self, level: Level, name: Option<&str>) -> FilterResult<Level> {
        let index = self.index.lock().clone();
        let (transition, resulting, token) = {
            let mut selection = self.selection.lock();
            let transition = match name {
                Some(name) => selection.set(level, name, &index)?,
                None => selection.clear(level)?,
            };
            (transition, selection.level(), self.tokens.issue())
        };
        match transition {
            Transition::Set(level) => info!(level = %level, name = name.unwrap_or_default(), token = token.get(), "filter set"),
            Transition::Clear(level) => info!(level = %level, token = token.get(), "filter cleared"),
        }
        self.sync(token).await;
        Ok(resulting)
    }

    /// Selectors, then scoped statistics, then highlight.
    async fn sync(&self, token: RequestToken) {
        let (advisory, filters) = {
            let selection = self.selection.lock();
            (selection.advisory(), selection.filters().clone())
        };
        let index = self.index.lock().clone();

        self.render_selectors(&Selectors::derive(advisory.is_some(), &filters, &index));

        if let Some(advisory) = advisory {
            let query = ScopedQuery::from_filters(&filters);
            let metrics = fetch_scoped_stats(self.api.as_ref(), advisory, &query).await;
            if !self.tokens.is_current(token) {
                debug!(token = token.get(), latest = self.tokens.latest().get(), "discarding stale statistics");
                return;
            }
            let stats = ScopedStats { title: panel_title(&filters), metrics, token };
            self.view.lock().render_stats(&stats);
            *self.panel.lock() = Some(stats);
        }

        let outcome = self.boundaries.highlight(self.api.as_ref(), filters.level(), &filters).await;
        if !self.tokens.is_current(token) {
            debug!(token = token.get(), latest = self.tokens.latest().get(), "discarding stale highlight");
            return;
        }
        match &outcome.target {
            HighlightTarget::Feature(highlight) => self.view.lock().apply_highlight(highlight),
            HighlightTarget::National => self.view.lock().reset_view(&self.extent),
        }
        *self.highlight.lock() = Some(outcome);
    }

    fn render_selectors(&self, selectors: &Selectors) {
        let mut view = self.view.lock();
        for selector in selectors.iter() {
            view.render_selector(selector);
        }
    }

    /// Boundary under `point` (lon, lat) at `level`, with its metrics.
    pub fn describe_point(&self, level: Level, point: Point<f64>) -> Option<HoverInfo> {
        let feature = self.boundaries.feature_at(level, point)?;
        let index = self.index.lock().clone();
        let parents = &feature.parents;
        let metrics = match level {
            Level::National => None,
            Level::Department => index.metrics(feature.name.as_str(), None, None),
            Level::Province => parents.department.as_ref()
                .and_then(|d| index.metrics(d.as_str(), Some(feature.name.as_str()), None)),
            Level::District => parents.department.as_ref().zip(parents.province.as_ref())
                .and_then(|(d, p)| index.metrics(d.as_str(), Some(p.as_str()), Some(feature.name.as_str()))),
        };
        Some(HoverInfo { level, name: feature.name, metrics })
    }

    pub fn selection(&self) -> Selection { self.selection.lock().clone() }
    pub fn filters(&self) -> Filters { self.selection.lock().filters().clone() }
    pub fn level(&self) -> Level { self.selection.lock().level() }
    pub fn index(&self) -> Arc<AggregationIndex> { self.index.lock().clone() }
    pub fn summary(&self) -> Option<AdvisorySummary> { *self.summary.lock() }
    pub fn hazard(&self) -> Arc<HazardLayer> { self.hazard.lock().clone() }
    pub fn stats(&self) -> Option<ScopedStats> { self.panel.lock().clone() }
    pub fn highlight(&self) -> Option<HighlightOutcome> { self.highlight.lock().clone() }
    pub fn boundaries(&self) -> &BoundaryCache { &self.boundaries }
    pub fn extent(&self) -> &NationalExtent { &self.extent }

    /// Selectors as they currently render.
    pub fn selectors(&self) -> Selectors {
        let selection = self.selection();
        Selectors::derive(selection.advisory().is_some(), selection.filters(), &self.index())
    }

    /// Run `f` with the view locked. `f` must not call back into the controller.
    pub fn with_view<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.view.lock())
    }
}
