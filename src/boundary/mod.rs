//! Administrative boundary layers and map highlighting.

mod cache;
mod highlight;
mod layer;

pub use cache::BoundaryCache;
pub use highlight::{FeatureStyle, Highlight, HighlightOutcome, HighlightSettings, HighlightTarget};
pub use layer::{BoundaryFeature, BoundaryLayer, JoinKey, ParentRefs};
