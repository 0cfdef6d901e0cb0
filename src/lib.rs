#![doc = "Hierarchical geo-filter controller for weather-advisory dashboards"]
mod aggregation;
mod api;
mod boundary;
mod controller;
mod error;
mod geom;
mod hazard;
mod io;
mod job;
mod selection;
mod stats;
mod types;
mod validate;
mod view;

pub mod cli;
pub mod commands;
pub mod config;

#[doc(inline)]
pub use types::{filter_advisories, normalize_name, Advisory, AdvisoryId, AdvisoryOrder, AdvisorySummary, Level, Metrics, PlaceName, Severity};

#[doc(inline)]
pub use aggregation::{AggregationIndex, DepartmentEntry, ProvinceEntry};

#[doc(inline)]
pub use selection::{Filters, Selection, Transition};

#[doc(inline)]
pub use error::{FilterError, FilterResult, JobError};

#[doc(inline)]
pub use boundary::{BoundaryCache, BoundaryFeature, BoundaryLayer, FeatureStyle, Highlight, HighlightOutcome, HighlightSettings, HighlightTarget, JoinKey, ParentRefs};

#[doc(inline)]
pub use hazard::{HazardLayer, HazardZone};

#[doc(inline)]
pub use api::{fetch_scoped_stats, fetch_summary, load_aggregations, load_hazard_layer, DashboardApi, HttpApi};

#[doc(inline)]
pub use stats::{panel_title, RequestToken, ScopedQuery, ScopedStats, TokenGate};

#[doc(inline)]
pub use view::{DashboardView, NationalExtent, Placeholder, SelectorState, Selectors};

#[doc(inline)]
pub use controller::{GeoFilterController, HoverInfo};

#[doc(inline)]
pub use job::{GenerationJob, JobEvent, JobMonitor, JobProgress, JobStatus, JobStream, LogSeverity};

#[doc(inline)]
pub use validate::{validate_advisory, Mismatch, ValidationReport};

#[doc(inline)]
pub use config::Config;
