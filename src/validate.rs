//! Offline reconciliation of the aggregation index against boundary names.
//!
//! At runtime a name without a boundary only degrades the highlight to the
//! parent level. This check lists every such name up front.

use std::fmt;

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregation::AggregationIndex;
use crate::api::DashboardApi;
use crate::boundary::{BoundaryLayer, JoinKey, ParentRefs};
use crate::types::{AdvisoryId, Level};

/// An aggregation entry with no matching boundary feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub level: Level,
    pub key: JoinKey,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10} {}", self.level.to_str(), self.key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Entries checked, per level
    pub checked: Vec<(Level, usize)>,
    pub mismatches: Vec<Mismatch>,
}

impl ValidationReport {
    #[inline]
    pub fn is_clean(&self) -> bool { self.mismatches.is_empty() }

    /// Check every index path at `level` against `layer`.
    pub fn check_level(&mut self, index: &AggregationIndex, layer: &BoundaryLayer) {
        let level = layer.ty;
        let paths = index.paths(level);
        for (department, province, district) in &paths {
            let (name, parents) = match level {
                Level::Department => (department.clone(), ParentRefs::default()),
                Level::Province => match province {
                    Some(p) => (p.clone(), ParentRefs { department: Some(department.clone()), province: None }),
                    None => continue,
                },
                Level::District => match district {
                    Some(d) => (d.clone(), ParentRefs { department: Some(department.clone()), province: province.clone() }),
                    None => continue,
                },
                Level::National => continue,
            };
            let key = JoinKey::new(level, name, &parents);
            if layer.find_compatible(&key).is_none() {
                self.mismatches.push(Mismatch { level, key });
            }
        }
        self.checked.push((level, paths.len()));
    }

    pub fn check(index: &AggregationIndex, layers: &[&BoundaryLayer]) -> Self {
        let mut report = Self::default();
        for layer in layers {
            report.check_level(index, layer);
        }
        report
    }
}

/// Fetch the advisory's aggregation index and all three boundary layers,
/// then cross-check them. Unlike the controller, fetch failures are errors.
pub async fn validate_advisory<A: DashboardApi + ?Sized>(api: &A, advisory: AdvisoryId) -> Result<ValidationReport> {
    let index = api.aggregations(advisory).await
        .with_context(|| format!("Failed to load aggregation index for advisory {advisory}"))?;

    let mut layers = Vec::with_capacity(Level::ADMINISTRATIVE.len());
    for level in Level::ADMINISTRATIVE {
        layers.push(api.boundaries(level).await
            .with_context(|| format!("Failed to load {level} boundaries"))?);
    }

    let report = ValidationReport::check(&index, &layers.iter().collect::<Vec<_>>());
    info!(advisory, mismatches = report.mismatches.len(), "validation finished");
    Ok(report)
}
