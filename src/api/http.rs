use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, Response};
use tracing::debug;

use super::{decode_advisories, decode_aggregations, decode_scoped_stats, decode_summary, DashboardApi};
use crate::aggregation::AggregationIndex;
use crate::boundary::BoundaryLayer;
use crate::config::ApiConfig;
use crate::hazard::HazardLayer;
use crate::io::sse::SseDecoder;
use crate::job::{JobEvent, JobStream};
use crate::stats::ScopedQuery;
use crate::types::{Advisory, AdvisoryId, AdvisorySummary, Level, Metrics};

/// Path segment of the boundary endpoint for each level.
fn boundary_path(level: Level) -> Option<&'static str> {
    match level {
        Level::Department => Some("departamentos"),
        Level::Province => Some("provincias"),
        Level::District => Some("distritos"),
        Level::National => None,
    }
}

/// [`DashboardApi`] over the advisory backend's JSON endpoints.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("advisory-geofilter/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_bytes(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let url = self.url(path);
        debug!(url = %url, ?query, "GET");
        let resp = self.client.get(&url).query(query).send().await
            .with_context(|| format!("GET {url}"))?;
        let resp = checked(resp, &url)?;
        let bytes = resp.bytes().await.with_context(|| format!("GET {url}: failed to read body"))?;
        Ok(bytes.to_vec())
    }
}

fn checked(resp: Response, url: &str) -> Result<Response> {
    resp.error_for_status().with_context(|| format!("{url} returned error status"))
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn advisories(&self) -> Result<Vec<Advisory>> {
        decode_advisories(&self.get_bytes("avisos", &[]).await?)
    }

    async fn aggregations(&self, advisory: AdvisoryId) -> Result<AggregationIndex> {
        decode_aggregations(&self.get_bytes(&format!("avisos/{advisory}/agregaciones"), &[]).await?)
    }

    async fn boundaries(&self, level: Level) -> Result<BoundaryLayer> {
        let segment = boundary_path(level)
            .with_context(|| format!("No boundary endpoint for level {level}"))?;
        let bytes = self.get_bytes(&format!("delimitaciones/{segment}"), &[]).await?;
        BoundaryLayer::from_geojson_slice(level, &bytes)
            .with_context(|| format!("Failed to decode {level} boundaries"))
    }

    async fn hazard_layer(&self, advisory: AdvisoryId) -> Result<HazardLayer> {
        let bytes = self.get_bytes(&format!("avisos/{advisory}/shp-geojson"), &[]).await?;
        HazardLayer::from_geojson_slice(&bytes)
            .with_context(|| format!("Failed to decode hazard layer for advisory {advisory}"))
    }

    async fn scoped_stats(&self, advisory: AdvisoryId, query: &ScopedQuery) -> Result<Metrics> {
        let path = format!("avisos/{advisory}/clientes-afectados");
        decode_scoped_stats(&self.get_bytes(&path, &query.pairs()).await?)
    }

    async fn summary(&self, advisory: AdvisoryId) -> Result<AdvisorySummary> {
        decode_summary(&self.get_bytes(&format!("avisos/{advisory}/estadisticas"), &[]).await?)
    }

    async fn start_generation(&self, advisory: AdvisoryId) -> Result<JobStream> {
        let url = self.url(&format!("avisos/{advisory}/procesar"));
        // The generator can run far longer than an ordinary request.
        let resp = self.client.get(&url)
            .query(&[("stream", "true")])
            .timeout(Duration::from_secs(60 * 60))
            .send().await
            .with_context(|| format!("GET {url}"))?;
        let resp = checked(resp, &url)?;

        let events = resp.bytes_stream()
            .scan(SseDecoder::default(), |decoder, chunk| {
                let decoded: Vec<Result<JobEvent>> = match chunk {
                    Ok(bytes) => decoder.push(&bytes).into_iter()
                        .map(|data| serde_json::from_str::<JobEvent>(&data)
                            .with_context(|| format!("Invalid generation event: {data}")))
                        .collect(),
                    Err(e) => vec![Err(anyhow::Error::new(e).context("Generation stream interrupted"))],
                };
                futures::future::ready(Some(decoded))
            })
            .flat_map(stream::iter);
        Ok(events.boxed())
    }

    async fn cancel_generation(&self, advisory: AdvisoryId) -> Result<()> {
        let url = self.url(&format!("avisos/{advisory}/cancel"));
        debug!(url = %url, "POST");
        let resp = self.client.post(&url).send().await
            .with_context(|| format!("POST {url}"))?;
        checked(resp, &url)?;
        Ok(())
    }
}
