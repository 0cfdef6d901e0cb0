use std::sync::Arc;

use anyhow::{Context, Result};
use geo::Point;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::highlight::{Highlight, HighlightOutcome, HighlightSettings, HighlightTarget};
use super::layer::{BoundaryFeature, BoundaryLayer, JoinKey, ParentRefs};
use crate::api::DashboardApi;
use crate::selection::Filters;
use crate::types::Level;

/// Boundary layers for the session, each fetched at most once.
///
/// Departments and provinces are loaded up front by [`load_eager`]; districts
/// are fetched on the first district highlight. Concurrent loads of the same
/// level share one fetch, and a failed fetch leaves the slot empty so a later
/// call can try again.
///
/// [`load_eager`]: BoundaryCache::load_eager
#[derive(Debug, Default)]
pub struct BoundaryCache {
    layers: [OnceCell<Arc<BoundaryLayer>>; 3],
    settings: HighlightSettings,
}

impl BoundaryCache {
    pub fn new(settings: HighlightSettings) -> Self {
        Self { layers: Default::default(), settings }
    }

    #[inline]
    pub fn settings(&self) -> &HighlightSettings { &self.settings }

    fn slot(&self, level: Level) -> Option<&OnceCell<Arc<BoundaryLayer>>> {
        level.depth().checked_sub(1).and_then(|i| self.layers.get(i))
    }

    /// Layer for `level` if it has already been loaded.
    pub fn loaded(&self, level: Level) -> Option<Arc<BoundaryLayer>> {
        self.slot(level)?.get().cloned()
    }

    /// Return the cached layer, fetching it first if needed.
    pub async fn load_level<A: DashboardApi + ?Sized>(&self, api: &A, level: Level) -> Result<Arc<BoundaryLayer>> {
        let slot = self.slot(level)
            .with_context(|| format!("No boundary layer exists for level {level}"))?;
        slot.get_or_try_init(|| async {
            info!(level = %level, "loading boundary layer");
            let layer = api.boundaries(level).await
                .with_context(|| format!("Failed to load {level} boundaries"))?;
            info!(level = %level, features = layer.len(), "boundary layer loaded");
            Ok::<_, anyhow::Error>(Arc::new(layer))
        })
        .await
        .cloned()
    }

    /// Load departments and provinces. Failures are logged and left empty.
    pub async fn load_eager<A: DashboardApi + ?Sized>(&self, api: &A) {
        let (departments, provinces) = tokio::join!(
            self.load_level(api, Level::Department),
            self.load_level(api, Level::Province)
        );
        for result in [departments, provinces] {
            if let Err(e) = result {
                warn!(error = format!("{e:#}"), "boundary layer unavailable; highlights will fall back");
            }
        }
    }

    /// Resolve the highlight for `requested`, walking up to parent levels
    /// when the selected name has no boundary. Never fails: the last resort
    /// is the national view.
    pub async fn highlight<A: DashboardApi + ?Sized>(&self, api: &A, requested: Level, filters: &Filters) -> HighlightOutcome {
        let mut level = requested;
        while level.is_administrative() {
            if let Some(highlight) = self.highlight_at(api, level, filters).await {
                if level != requested {
                    info!(requested = %requested, resolved = %level, "highlight fell back to parent level");
                }
                return HighlightOutcome { requested, target: HighlightTarget::Feature(highlight) };
            }
            let Some(parent) = level.parent() else { break };
            level = parent;
        }
        debug!(requested = %requested, "highlighting national view");
        HighlightOutcome::national(requested)
    }

    async fn highlight_at<A: DashboardApi + ?Sized>(&self, api: &A, level: Level, filters: &Filters) -> Option<Highlight> {
        let name = filters.get(level)?.clone();

        let layer = if level == Level::District {
            match self.load_level(api, level).await {
                Ok(layer) => layer,
                Err(e) => {
                    warn!(level = %level, error = format!("{e:#}"), "cannot highlight without boundaries");
                    return None;
                }
            }
        } else {
            let Some(layer) = self.loaded(level) else {
                warn!(level = %level, "boundary layer not loaded; cannot highlight");
                return None;
            };
            layer
        };

        let parents = ParentRefs { department: filters.department.clone(), province: filters.province.clone() };
        let key = JoinKey::new(level, name, &parents);
        let found = layer.find_compatible(&key)
            .and_then(|idx| Some((idx, layer.bounds_of(idx)?)));

        let Some((selected, bounds)) = found else {
            warn!(
                level = %level,
                key = %key,
                available = ?layer.sample_names(self.settings.sample_names),
                total = layer.len(),
                "no boundary matches selection"
            );
            return None;
        };

        debug!(level = %level, key = %key, feature = selected, "boundary matched");
        Some(Highlight {
            level,
            selected,
            features: layer.len(),
            name: key.name,
            bounds,
            padding: self.settings.padding_for(level),
        })
    }

    /// Feature under `point` (lon, lat) in an already loaded layer.
    pub fn feature_at(&self, level: Level, point: Point<f64>) -> Option<BoundaryFeature> {
        self.loaded(level)?.feature_at(point).cloned()
    }
}
