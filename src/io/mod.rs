//! Format-specific decoding of remote payloads.
//!
//! - `geojson` - GeoJSON FeatureCollections into boundary and hazard layers
//! - `sse` - server-sent event frames from the map-generation stream

pub(crate) mod geojson;
pub(crate) mod sse;
