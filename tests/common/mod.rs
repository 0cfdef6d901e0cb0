#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use advisory_geofilter::{
    Advisory, AdvisoryId, AdvisorySummary, AggregationIndex, BoundaryLayer, Config, DashboardApi, DashboardView,
    GeoFilterController, HazardLayer, HazardZone, Highlight, JobEvent, JobStream, Level, Metrics, NationalExtent,
    ScopedQuery, ScopedStats, SelectorState, Severity,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};

pub const ADVISORY: AdvisoryId = 412;

/// Axis-aligned square feature with the given properties.
pub fn square(x0: f64, y0: f64, size: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]]]
        }
    })
}

pub fn aggregations() -> Value {
    json!({
        "LIMA": {
            "total": 60, "hectareas": 120.0, "monto": 3000000.0,
            "provincias": {
                "HUAURA": {
                    "total": 30, "hectareas": 50.0, "monto": 1000000.0,
                    "distritos": {
                        "HUACHO": { "total": 10, "hectareas": 20.0, "monto": 400000.0 },
                        "VEGUETA": { "total": 20, "hectareas": 30.0, "monto": 600000.0 }
                    }
                },
                " cañete ": {
                    "total": 25, "hectareas": 60.0, "monto": 1500000.0,
                    "distritos": {
                        "MALA": { "total": 15, "hectareas": 40.0, "monto": 1000000.0 },
                        "ASIA": { "total": 10, "hectareas": 20.0, "monto": 500000.0 }
                    }
                },
                "LIMA": {
                    "total": 5, "hectareas": 10.0, "monto": 500000.0,
                    "distritos": { "MIRAFLORES": { "total": 5, "hectareas": 10.0, "monto": 500000.0 } }
                }
            }
        },
        "ica": {
            "total": 8, "hectareas": 16.0, "monto": 200000.0,
            "provincias": {
                "PISCO": {
                    "total": 8, "hectareas": 16.0, "monto": 200000.0,
                    "distritos": { "PARACAS": { "total": 8, "hectareas": 16.0, "monto": 200000.0 } }
                }
            }
        }
    })
}

/// Boundaries for the fixture. The LIMA province and the ASIA district have
/// no polygon, so highlighting them falls back to the parent.
pub fn boundaries() -> HashMap<Level, Value> {
    let departments = json!({ "type": "FeatureCollection", "features": [
        square(0.0, 0.0, 10.0, json!({ "DEPARTAMEN": " Lima " })),
        square(10.0, 0.0, 10.0, json!({ "NOMBDEP": "ICA" })),
    ]});
    let provinces = json!({ "type": "FeatureCollection", "features": [
        square(0.0, 0.0, 5.0, json!({ "PROVINCIA": "Huaura", "DEPARTAMEN": "LIMA" })),
        square(5.0, 0.0, 5.0, json!({ "PROVINCIA": "CAÑETE", "DEPARTAMEN": "lima" })),
        square(10.0, 0.0, 10.0, json!({ "PROVINCIA": "PISCO", "DEPARTAMEN": "ICA" })),
    ]});
    let districts = json!({ "type": "FeatureCollection", "features": [
        square(0.0, 0.0, 2.5, json!({ "DISTRITO": "HUACHO", "PROVINCIA": "HUAURA", "DEPARTAMEN": "LIMA" })),
        square(2.5, 0.0, 2.5, json!({ "DISTRITO": "vegueta", "PROVINCIA": "HUAURA", "DEPARTAMEN": "LIMA" })),
        square(5.0, 0.0, 2.5, json!({ "DISTRITO": "MALA", "PROVINCIA": "CAÑETE", "DEPARTAMEN": "LIMA" })),
        square(10.0, 0.0, 2.5, json!({ "DISTRITO": "PARACAS", "PROVINCIA": "PISCO", "DEPARTAMEN": "ICA" })),
    ]});
    HashMap::from([(Level::Department, departments), (Level::Province, provinces), (Level::District, districts)])
}

/// Risk polygons for [`ADVISORY`]: one red and one orange zone over LIMA, and
/// a green zone over ICA that must never be drawn.
pub fn hazard() -> Value {
    let zone = |x0: f64, size: f64, nivel: &str, color: &str, name: &str| {
        square(x0, 0.0, size, json!({ "nivel": nivel, "color": color, "name": name }))
    };
    json!({
        "type": "FeatureCollection",
        "dia_critico": "dia1",
        "features": [
            zone(0.0, 4.0, "Nivel 4", "#FF0000", "HUAURA"),
            zone(5.0, 3.0, "Nivel 3", "#FF8C00", "CAÑETE"),
            zone(10.0, 10.0, "Nivel 1", "#90EE90", "PISCO"),
        ],
        "total": 3
    })
}

/// In-memory [`DashboardApi`] with call counters and failure switches.
pub struct FakeApi {
    pub advisories: Vec<Advisory>,
    pub aggregations: Value,
    pub boundaries: HashMap<Level, Value>,
    /// Hazard collections by advisory; other advisories fail to load
    pub hazards: HashMap<AdvisoryId, Value>,
    pub summary: AdvisorySummary,
    pub boundary_calls: Mutex<HashMap<Level, usize>>,
    /// Number of upcoming fetches of a level that fail
    pub boundary_failures: Mutex<HashMap<Level, usize>>,
    pub fail_aggregations: AtomicBool,
    pub fail_stats: AtomicBool,
    pub stats_calls: Mutex<Vec<ScopedQuery>>,
    /// Stats requests whose deepest filter is a key here wait for its notify
    pub stats_gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub generation: Mutex<Option<mpsc::UnboundedReceiver<Result<JobEvent>>>>,
    pub cancels: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            advisories: vec![
                Advisory { id: ADVISORY, color: Severity::Red, title: "Lluvias intensas".into() },
                Advisory { id: 413, color: Severity::Yellow, title: "Heladas".into() },
            ],
            aggregations: aggregations(),
            boundaries: boundaries(),
            hazards: HashMap::from([(ADVISORY, hazard())]),
            summary: AdvisorySummary {
                color: Severity::Red,
                critical: 4,
                high_risk: 11,
                totals: Metrics::new(68, 136.0, 3_200_000.0),
            },
            boundary_calls: Mutex::new(HashMap::new()),
            boundary_failures: Mutex::new(HashMap::new()),
            fail_aggregations: AtomicBool::new(false),
            fail_stats: AtomicBool::new(false),
            stats_calls: Mutex::new(Vec::new()),
            stats_gates: Mutex::new(HashMap::new()),
            generation: Mutex::new(None),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn boundary_calls(&self, level: Level) -> usize {
        self.boundary_calls.lock().get(&level).copied().unwrap_or(0)
    }

    pub fn fail_next_boundaries(&self, level: Level, times: usize) {
        self.boundary_failures.lock().insert(level, times);
    }

    /// Hold stats requests whose deepest filter is `name` until notified.
    pub fn hold_stats(&self, name: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.stats_gates.lock().insert(name.to_string(), gate.clone());
        gate
    }

    /// Feed for the next generation stream.
    pub fn generation_feed(&self) -> mpsc::UnboundedSender<Result<JobEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.generation.lock() = Some(rx);
        tx
    }

    fn index(&self) -> Result<AggregationIndex> {
        AggregationIndex::from_value(&self.aggregations)
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn advisories(&self) -> Result<Vec<Advisory>> {
        Ok(self.advisories.clone())
    }

    async fn aggregations(&self, advisory: AdvisoryId) -> Result<AggregationIndex> {
        if self.fail_aggregations.load(Ordering::SeqCst) {
            bail!("aggregations for {advisory} unavailable");
        }
        self.index()
    }

    async fn boundaries(&self, level: Level) -> Result<BoundaryLayer> {
        *self.boundary_calls.lock().entry(level).or_default() += 1;
        // Let concurrent callers overlap with this fetch.
        tokio::task::yield_now().await;

        {
            let mut failures = self.boundary_failures.lock();
            if let Some(remaining) = failures.get_mut(&level).filter(|n| **n > 0) {
                *remaining -= 1;
                bail!("{level} boundaries unavailable");
            }
        }
        let value = self.boundaries.get(&level).ok_or_else(|| anyhow!("no {level} fixture"))?;
        BoundaryLayer::from_geojson_value(level, value)
    }

    async fn hazard_layer(&self, advisory: AdvisoryId) -> Result<HazardLayer> {
        let value = self.hazards.get(&advisory).ok_or_else(|| anyhow!("Aviso {advisory} no encontrado"))?;
        HazardLayer::from_geojson_value(value)
    }

    async fn scoped_stats(&self, _advisory: AdvisoryId, query: &ScopedQuery) -> Result<Metrics> {
        self.stats_calls.lock().push(query.clone());
        let deepest = query.pairs().last().map(|(_, v)| v.to_string());
        let gate = deepest.and_then(|name| self.stats_gates.lock().get(&name).cloned());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_stats.load(Ordering::SeqCst) {
            bail!("stats unavailable");
        }

        let index = self.index()?;
        let Some(department) = &query.department else {
            let mut total = Metrics::default();
            for name in index.departments() {
                total += index.metrics(name.as_str(), None, None).unwrap_or_default();
            }
            return Ok(total);
        };
        Ok(index.metrics(
            department.as_str(),
            query.province.as_ref().map(|p| p.as_str()),
            query.district.as_ref().map(|d| d.as_str()),
        ).unwrap_or_default())
    }

    async fn summary(&self, _advisory: AdvisoryId) -> Result<AdvisorySummary> {
        Ok(self.summary)
    }

    async fn start_generation(&self, advisory: AdvisoryId) -> Result<JobStream> {
        let rx = self.generation.lock().take()
            .ok_or_else(|| anyhow!("no generation feed for advisory {advisory}"))?;
        Ok(stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|event| (event, rx)) }).boxed())
    }

    async fn cancel_generation(&self, _advisory: AdvisoryId) -> Result<()> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Everything the controller asked the view to show, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Selector(SelectorState),
    Stats(ScopedStats),
    Summary(AdvisorySummary),
    Hazard(Vec<HazardZone>),
    Highlight(Highlight),
    Reset(NationalExtent),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<Rendered>,
}

impl DashboardView for RecordingView {
    fn render_selector(&mut self, selector: &SelectorState) {
        self.events.push(Rendered::Selector(selector.clone()));
    }
    fn render_stats(&mut self, stats: &ScopedStats) {
        self.events.push(Rendered::Stats(stats.clone()));
    }
    fn render_summary(&mut self, summary: &AdvisorySummary) {
        self.events.push(Rendered::Summary(*summary));
    }
    fn render_hazard_layer(&mut self, hazard: &HazardLayer) {
        self.events.push(Rendered::Hazard(hazard.zones().to_vec()));
    }
    fn apply_highlight(&mut self, highlight: &Highlight) {
        self.events.push(Rendered::Highlight(highlight.clone()));
    }
    fn reset_view(&mut self, extent: &NationalExtent) {
        self.events.push(Rendered::Reset(*extent));
    }
}

pub type Controller = GeoFilterController<FakeApi, RecordingView>;

/// Initialized controller with [`ADVISORY`] selected and the view log cleared.
pub async fn controller(api: Arc<FakeApi>) -> Controller {
    let controller = GeoFilterController::new(api, RecordingView::default(), &Config::default());
    controller.init().await;
    controller.select_advisory(ADVISORY).await;
    controller.with_view(|v| v.events.clear());
    controller
}

/// Drain the view log.
pub fn take_events(controller: &Controller) -> Vec<Rendered> {
    controller.with_view(|v| std::mem::take(&mut v.events))
}
