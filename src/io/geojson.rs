use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::boundary::{BoundaryFeature, BoundaryLayer, ParentRefs};
use crate::hazard::{HazardLayer, HazardZone};
use crate::types::{Level, PlaceName, Severity};

/// Property columns that may hold a feature's own name, in priority order.
fn name_columns(level: Level) -> &'static [&'static str] {
    match level {
        Level::Department => &["DEPARTAMEN", "DPTONOM02", "NAME", "NOMBDEP", "DEPARTAMENTO", "nombre"],
        Level::Province => &["PROVINCIA", "nombre", "NAME"],
        Level::District => &["DISTRITO", "nombre", "NAME"],
        Level::National => &[],
    }
}

const DEPARTMENT_PARENT_COLUMNS: [&str; 3] = ["DEPARTAMEN", "DEPARTAMENTO", "NOMBDEP"];
const PROVINCE_PARENT_COLUMNS: [&str; 1] = ["PROVINCIA"];

/// First non-blank string property among `columns`, normalized.
fn first_name(properties: &Map<String, Value>, columns: &[&str]) -> Option<PlaceName> {
    columns.iter()
        .filter_map(|col| properties.get(*col)?.as_str())
        .find_map(PlaceName::new)
}

impl BoundaryLayer {
    /// Read a boundary layer from GeoJSON FeatureCollection bytes.
    pub fn from_geojson_slice(level: Level, bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
        Self::from_geojson_value(level, &value)
    }

    /// Read a boundary layer from a parsed GeoJSON FeatureCollection.
    /// Features without a usable name or polygonal geometry are skipped.
    pub fn from_geojson_value(level: Level, value: &Value) -> Result<Self> {
        if !level.is_administrative() {
            bail!("No boundary layer exists for level {level}");
        }
        let features = value["features"].as_array()
            .ok_or_else(|| anyhow!("Invalid GeoJSON: {level} collection has no features array"))?;

        let mut entities = Vec::with_capacity(features.len());
        let mut shapes = Vec::with_capacity(features.len());
        let empty = Map::new();

        for (idx, feature) in features.iter().enumerate() {
            let properties = feature["properties"].as_object().unwrap_or(&empty);

            let Some(name) = first_name(properties, name_columns(level)) else {
                warn!(level = %level, feature = idx, "skipping boundary feature without a name");
                continue;
            };

            let shape = match parse_geometry(&feature["geometry"]) {
                Ok(Some(shape)) => shape,
                Ok(None) => {
                    warn!(level = %level, name = %name, "skipping boundary feature without polygon geometry");
                    continue;
                }
                Err(e) => {
                    warn!(level = %level, name = %name, error = %e, "skipping boundary feature with invalid geometry");
                    continue;
                }
            };

            let parents = ParentRefs {
                department: if level >= Level::Province { first_name(properties, &DEPARTMENT_PARENT_COLUMNS) } else { None },
                province: if level >= Level::District { first_name(properties, &PROVINCE_PARENT_COLUMNS) } else { None },
            };

            entities.push(BoundaryFeature { name, parents });
            shapes.push(shape);
        }

        debug!(level = %level, features = entities.len(), skipped = features.len() - entities.len(), "boundary layer decoded");
        Ok(BoundaryLayer::new(level, entities, shapes))
    }
}

impl HazardLayer {
    pub fn from_geojson_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).context("Failed to parse hazard GeoJSON bytes")?;
        Self::from_geojson_value(&value)
    }

    /// Read an advisory's risk polygons. Severity comes from the `nivel`
    /// property; zones whose severity has no fill color are dropped.
    pub fn from_geojson_value(value: &Value) -> Result<Self> {
        let features = value["features"].as_array()
            .ok_or_else(|| anyhow!("Invalid GeoJSON: hazard collection has no features array"))?;

        let mut zones = Vec::with_capacity(features.len());
        let mut shapes = Vec::with_capacity(features.len());
        let mut hidden = 0usize;
        let empty = Map::new();

        for (idx, feature) in features.iter().enumerate() {
            let properties = feature["properties"].as_object().unwrap_or(&empty);
            let severity = properties.get("nivel").and_then(Value::as_str)
                .and_then(Severity::from_risk_level)
                .unwrap_or_default();
            let Some(fill_color) = severity.fill_color() else {
                hidden += 1;
                continue;
            };

            let shape = match parse_geometry(&feature["geometry"]) {
                Ok(Some(shape)) => shape,
                Ok(None) => {
                    warn!(feature = idx, "skipping hazard feature without polygon geometry");
                    continue;
                }
                Err(e) => {
                    warn!(feature = idx, error = %e, "skipping hazard feature with invalid geometry");
                    continue;
                }
            };

            let name = properties.get("name").and_then(Value::as_str).unwrap_or_default().trim().to_string();
            zones.push(HazardZone { name, severity, fill_color });
            shapes.push(shape);
        }

        let critical_day = value["dia_critico"].as_str().map(str::to_string);
        debug!(zones = zones.len(), hidden, critical_day = ?critical_day, "hazard layer decoded");
        Ok(HazardLayer::new(zones, shapes, critical_day))
    }
}

/// Convert a GeoJSON geometry object into a MultiPolygon.
/// Returns `Ok(None)` for null or non-polygonal geometry.
fn parse_geometry(geometry: &Value) -> Result<Option<MultiPolygon<f64>>> {
    let Some(geometry) = geometry.as_object() else { return Ok(None) };
    let coords = geometry.get("coordinates").and_then(Value::as_array);

    match (geometry.get("type").and_then(Value::as_str), coords) {
        (Some("Polygon"), Some(rings)) => Ok(Some(MultiPolygon(vec![parse_polygon_coords(rings)?]))),
        (Some("MultiPolygon"), Some(polygons)) => {
            let polygons = polygons.iter()
                .map(|p| p.as_array()
                    .ok_or_else(|| anyhow!("Invalid MultiPolygon: polygon is not an array"))
                    .and_then(|rings| parse_polygon_coords(rings)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(MultiPolygon(polygons)))
        }
        _ => Ok(None),
    }
}

/// Parse polygon rings: the first is the exterior, the rest are holes.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("Invalid Polygon: ring is not an array"))
            .and_then(|coords| parse_ring_coords(coords))
    });
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from GeoJSON coordinates `[[x, y], [x, y], ...]`.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());

    for coord_pair in coords {
        let pair = coord_pair.as_array()
            .filter(|pair| pair.len() >= 2)
            .ok_or_else(|| anyhow!("Invalid coordinate: expected [x, y]"))?;
        let x = pair[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
        let y = pair[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
        points.push(Coord { x, y });
    }

    // Ensure ring is closed (first point == last point)
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first != last {
            points.push(first);
        }
    }

    Ok(LineString(points))
}
