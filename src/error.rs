//! Error types for filter transitions and map generation

use thiserror::Error;

use crate::types::{AdvisoryId, Level, Severity};

/// Rejected selection transitions. The selection is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// No advisory has been selected yet
    #[error("no advisory selected")]
    NoAdvisory,

    /// The level above has no selection
    #[error("cannot change the {level} filter before selecting its parent")]
    ParentNotSelected { level: Level },

    /// The name is not offered under the current parent
    #[error("{name:?} is not a {level} of the current selection")]
    UnknownPlace { level: Level, name: String },

    /// Name was blank after trimming
    #[error("empty {level} name")]
    EmptyName { level: Level },

    /// National is not a filter slot
    #[error("{level} is not a filterable level")]
    NotFilterable { level: Level },
}

/// Result type for selection transitions
pub type FilterResult<T> = Result<T, FilterError>;

/// Rejected map-generation requests
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Only red and orange advisories have hazard maps
    #[error("advisory {advisory} is {color}; maps are only generated for rojo or naranja advisories")]
    NotEligible { advisory: AdvisoryId, color: Severity },

    /// A generation job is already streaming
    #[error("map generation is already running")]
    AlreadyRunning,
}
