//! Remote dashboard API.
//!
//! [`DashboardApi`] is the seam between the controller and the advisory
//! backend; [`HttpApi`] talks to the real server, tests substitute fakes.
//! The wire decoders here are shared by every implementation that receives
//! raw JSON.

mod http;

pub use http::HttpApi;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::aggregation::AggregationIndex;
use crate::boundary::BoundaryLayer;
use crate::hazard::HazardLayer;
use crate::job::JobStream;
use crate::stats::ScopedQuery;
use crate::types::{Advisory, AdvisoryId, AdvisorySummary, Level, Metrics, Severity};

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Every advisory known to the backend.
    async fn advisories(&self) -> Result<Vec<Advisory>>;

    /// Department → province → district metrics for one advisory.
    async fn aggregations(&self, advisory: AdvisoryId) -> Result<AggregationIndex>;

    /// Boundary polygons for one administrative level.
    async fn boundaries(&self, level: Level) -> Result<BoundaryLayer>;

    /// Risk polygons of one advisory, coloured by severity.
    async fn hazard_layer(&self, advisory: AdvisoryId) -> Result<HazardLayer>;

    /// Affected-client totals restricted to the query's filters.
    async fn scoped_stats(&self, advisory: AdvisoryId, query: &ScopedQuery) -> Result<Metrics>;

    /// Whole-advisory KPIs.
    async fn summary(&self, advisory: AdvisoryId) -> Result<AdvisorySummary>;

    /// Start map generation and stream its events.
    async fn start_generation(&self, advisory: AdvisoryId) -> Result<JobStream>;

    async fn cancel_generation(&self, advisory: AdvisoryId) -> Result<()>;
}

/// Fetch the aggregation index, or an empty one if the fetch fails.
pub async fn load_aggregations<A: DashboardApi + ?Sized>(api: &A, advisory: AdvisoryId) -> AggregationIndex {
    match api.aggregations(advisory).await {
        Ok(index) => {
            debug!(advisory, departments = index.len(), "aggregation index loaded");
            index
        }
        Err(e) => {
            warn!(advisory, error = format!("{e:#}"), "failed to load aggregation index; using an empty one");
            AggregationIndex::empty()
        }
    }
}

/// Fetch the hazard overlay, or an empty one if the fetch fails.
pub async fn load_hazard_layer<A: DashboardApi + ?Sized>(api: &A, advisory: AdvisoryId) -> HazardLayer {
    match api.hazard_layer(advisory).await {
        Ok(layer) => {
            debug!(advisory, zones = layer.len(), "hazard layer loaded");
            layer
        }
        Err(e) => {
            warn!(advisory, error = format!("{e:#}"), "failed to load hazard layer; drawing none");
            HazardLayer::empty()
        }
    }
}

/// Fetch scoped statistics, or zeros if the fetch fails.
pub async fn fetch_scoped_stats<A: DashboardApi + ?Sized>(api: &A, advisory: AdvisoryId, query: &ScopedQuery) -> Metrics {
    match api.scoped_stats(advisory, query).await {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!(advisory, query = ?query.pairs(), error = format!("{e:#}"), "failed to fetch scoped statistics");
            Metrics::default()
        }
    }
}

/// Fetch summary KPIs, or defaults if the fetch fails.
pub async fn fetch_summary<A: DashboardApi + ?Sized>(api: &A, advisory: AdvisoryId) -> AdvisorySummary {
    match api.summary(advisory).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(advisory, error = format!("{e:#}"), "failed to fetch advisory summary");
            AdvisorySummary::default()
        }
    }
}

#[derive(Deserialize)]
struct AdvisoryList {
    #[serde(alias = "avisos", default)]
    advisories: Vec<Advisory>,
}

#[derive(Deserialize)]
struct AggregationEnvelope {
    #[serde(alias = "agregaciones", default)]
    aggregations: serde_json::Value,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawClientTotals {
    total_agricultores: u64,
    total_hectareas: f64,
    total_monto_asegurado: f64,
}

#[derive(Deserialize)]
struct ClientsEnvelope {
    #[serde(alias = "clientes", default)]
    clients: RawClientTotals,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawCount {
    count: u64,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSummary {
    color: Severity,
    critico: RawCount,
    alto_riesgo: RawCount,
    agricultores_total: u64,
    poliza_total: f64,
    hectareas_total: f64,
}

pub(crate) fn decode_advisories(bytes: &[u8]) -> Result<Vec<Advisory>> {
    let list: AdvisoryList = serde_json::from_slice(bytes).context("Invalid advisory list")?;
    Ok(list.advisories)
}

pub(crate) fn decode_aggregations(bytes: &[u8]) -> Result<AggregationIndex> {
    let envelope: AggregationEnvelope = serde_json::from_slice(bytes).context("Invalid aggregation payload")?;
    if envelope.aggregations.is_null() {
        return Ok(AggregationIndex::empty());
    }
    AggregationIndex::from_value(&envelope.aggregations)
}

pub(crate) fn decode_scoped_stats(bytes: &[u8]) -> Result<Metrics> {
    let envelope: ClientsEnvelope = serde_json::from_slice(bytes).context("Invalid scoped statistics payload")?;
    let c = envelope.clients;
    Ok(Metrics::new(c.total_agricultores, c.total_hectareas, c.total_monto_asegurado))
}

pub(crate) fn decode_summary(bytes: &[u8]) -> Result<AdvisorySummary> {
    let raw: RawSummary = serde_json::from_slice(bytes).context("Invalid advisory summary payload")?;
    Ok(AdvisorySummary {
        color: raw.color,
        critical: raw.critico.count,
        high_risk: raw.alto_riesgo.count,
        totals: Metrics::new(raw.agricultores_total, raw.hectareas_total, raw.poliza_total),
    })
}
