use ahash::AHashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::types::{Level, Metrics, PlaceName};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvinceEntry {
    pub metrics: Metrics,
    pub districts: AHashMap<PlaceName, Metrics>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentEntry {
    pub metrics: Metrics,
    pub provinces: AHashMap<PlaceName, ProvinceEntry>,
}

/// Per-advisory nested lookup department -> province -> district -> metrics.
/// Only used to populate dependent selectors, never for geometry.
/// Replaced wholesale on each advisory load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationIndex {
    departments: AHashMap<PlaceName, DepartmentEntry>,
}

// Wire shapes as served by the aggregation endpoint. Metric keys are the
// dashboard's (`total`, `hectareas`, `monto`); names are not yet normalized.
#[derive(Deserialize)]
struct RawMetrics {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    hectareas: f64,
    #[serde(default)]
    monto: f64,
}

#[derive(Deserialize)]
struct RawProvince {
    #[serde(flatten)]
    metrics: RawMetrics,
    #[serde(default, alias = "districts")]
    distritos: AHashMap<String, RawMetrics>,
}

#[derive(Deserialize)]
struct RawDepartment {
    #[serde(flatten)]
    metrics: RawMetrics,
    #[serde(default, alias = "provinces")]
    provincias: AHashMap<String, RawProvince>,
}

impl From<RawMetrics> for Metrics {
    fn from(raw: RawMetrics) -> Self {
        Metrics::new(raw.total, raw.hectareas, raw.monto)
    }
}

/// Sorted copy of the keys of a name-keyed map.
fn sorted_names<V>(map: &AHashMap<PlaceName, V>) -> Vec<PlaceName> {
    let mut names: Vec<PlaceName> = map.keys().cloned().collect();
    names.sort();
    names
}

impl AggregationIndex {
    pub fn empty() -> Self { Self::default() }

    #[inline] pub fn is_empty(&self) -> bool { self.departments.is_empty() }
    #[inline] pub fn len(&self) -> usize { self.departments.len() }

    /// Decode the nested `{ DEPT: { provincias: { PROV: { distritos: { DIST: metrics }}}}}` map.
    /// Keys are normalized here; raw keys that collapse onto the same name are merged.
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw: AHashMap<String, RawDepartment> = serde_json::from_value(value.clone())
            .context("Failed to decode aggregation index")?;

        let mut departments: AHashMap<PlaceName, DepartmentEntry> = AHashMap::with_capacity(raw.len());
        for (raw_dept, dept) in raw {
            let Some(dept_name) = PlaceName::new(&raw_dept) else {
                warn!(key = %raw_dept, "skipping aggregation entry with blank department name");
                continue;
            };
            let dept_entry = departments.entry(dept_name).or_default();
            dept_entry.metrics += dept.metrics.into();

            for (raw_prov, prov) in dept.provincias {
                let Some(prov_name) = PlaceName::new(&raw_prov) else {
                    warn!(key = %raw_prov, "skipping aggregation entry with blank province name");
                    continue;
                };
                let prov_entry = dept_entry.provinces.entry(prov_name).or_default();
                prov_entry.metrics += prov.metrics.into();

                for (raw_dist, dist) in prov.distritos {
                    let Some(dist_name) = PlaceName::new(&raw_dist) else {
                        warn!(key = %raw_dist, "skipping aggregation entry with blank district name");
                        continue;
                    };
                    *prov_entry.districts.entry(dist_name).or_default() += dist.into();
                }
            }
        }

        Ok(Self { departments })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).context("Failed to parse aggregation JSON")?;
        Self::from_value(&value)
    }

    pub fn department(&self, department: &str) -> Option<&DepartmentEntry> {
        self.departments.get(department)
    }

    pub fn province(&self, department: &str, province: &str) -> Option<&ProvinceEntry> {
        self.department(department)?.provinces.get(province)
    }

    /// Department names, sorted ascending.
    pub fn departments(&self) -> Vec<PlaceName> {
        sorted_names(&self.departments)
    }

    /// Provinces under `department`, sorted ascending. Empty if the department is absent.
    pub fn provinces(&self, department: &str) -> Vec<PlaceName> {
        self.department(department)
            .map(|d| sorted_names(&d.provinces))
            .unwrap_or_default()
    }

    /// Districts under `department`/`province`, sorted ascending.
    pub fn districts(&self, department: &str, province: &str) -> Vec<PlaceName> {
        self.province(department, province)
            .map(|p| sorted_names(&p.districts))
            .unwrap_or_default()
    }

    pub fn contains_department(&self, department: &str) -> bool {
        self.departments.contains_key(department)
    }

    pub fn contains_province(&self, department: &str, province: &str) -> bool {
        self.province(department, province).is_some()
    }

    pub fn contains_district(&self, department: &str, province: &str, district: &str) -> bool {
        self.province(department, province)
            .is_some_and(|p| p.districts.contains_key(district))
    }

    /// Metrics at the deepest given level; `None` if any given name is absent.
    pub fn metrics(&self, department: &str, province: Option<&str>, district: Option<&str>) -> Option<Metrics> {
        let dept = self.department(department)?;
        let Some(province) = province else { return Some(dept.metrics) };
        let prov = dept.provinces.get(province)?;
        let Some(district) = district else { return Some(prov.metrics) };
        prov.districts.get(district).copied()
    }

    /// Every `(department, province, district)` path present at `level`,
    /// with the deeper slots `None`. Sorted.
    pub fn paths(&self, level: Level) -> Vec<(PlaceName, Option<PlaceName>, Option<PlaceName>)> {
        let mut out = Vec::new();
        for (dept_name, dept) in &self.departments {
            match level {
                Level::National => {}
                Level::Department => out.push((dept_name.clone(), None, None)),
                Level::Province => {
                    for prov_name in dept.provinces.keys() {
                        out.push((dept_name.clone(), Some(prov_name.clone()), None));
                    }
                }
                Level::District => {
                    for (prov_name, prov) in &dept.provinces {
                        for dist_name in prov.districts.keys() {
                            out.push((dept_name.clone(), Some(prov_name.clone()), Some(dist_name.clone())));
                        }
                    }
                }
            }
        }
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> AggregationIndex {
        AggregationIndex::from_value(&json!({
            "LIMA": {
                "total": 3, "hectareas": 12.5, "monto": 30000.0,
                "provincias": {
                    "HUAURA": { "total": 1, "hectareas": 2.5, "monto": 5000.0,
                        "distritos": { "HUACHO": { "total": 1, "hectareas": 2.5, "monto": 5000.0 } } },
                    "CANETE": { "total": 2, "hectareas": 10.0, "monto": 25000.0,
                        "distritos": { "MALA": { "total": 1 }, "ASIA": { "total": 1 } } }
                }
            },
            "cusco ": { "total": 1, "provincias": {} }
        })).unwrap()
    }

    #[test]
    fn keys_are_normalized_and_sorted() {
        let index = sample();
        assert_eq!(index.departments(), vec![PlaceName::new("CUSCO").unwrap(), PlaceName::new("LIMA").unwrap()]);
        assert_eq!(index.provinces("LIMA"), vec![PlaceName::new("CANETE").unwrap(), PlaceName::new("HUAURA").unwrap()]);
        assert_eq!(index.districts("LIMA", "CANETE"), vec![PlaceName::new("ASIA").unwrap(), PlaceName::new("MALA").unwrap()]);
    }

    #[test]
    fn absent_parents_yield_no_children() {
        let index = sample();
        assert!(index.provinces("PIURA").is_empty());
        assert!(index.districts("LIMA", "PIURA").is_empty());
        assert!(index.districts("CUSCO", "CANETE").is_empty());
        assert!(!index.contains_province("CUSCO", "CANETE"));
        assert!(index.contains_district("LIMA", "HUAURA", "HUACHO"));
    }

    #[test]
    fn colliding_keys_are_merged() {
        let index = AggregationIndex::from_value(&json!({
            "Lima": { "total": 1, "provincias": { "Huaura": { "total": 1 } } },
            "LIMA ": { "total": 2, "provincias": { "HUAURA": { "total": 2 }, "CANETE": { "total": 0 } } }
        })).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.metrics("LIMA", None, None).unwrap().farmers, 3);
        assert_eq!(index.metrics("LIMA", Some("HUAURA"), None).unwrap().farmers, 3);
        assert_eq!(index.provinces("LIMA").len(), 2);
    }

    #[test]
    fn metrics_by_depth() {
        let index = sample();
        assert_eq!(index.metrics("LIMA", None, None).unwrap().farmers, 3);
        assert_eq!(index.metrics("LIMA", Some("HUAURA"), Some("HUACHO")).unwrap().hectares, 2.5);
        assert_eq!(index.metrics("LIMA", Some("HUAURA"), Some("MALA")), None);
    }

    #[test]
    fn paths_per_level() {
        let index = sample();
        assert_eq!(index.paths(Level::Department).len(), 2);
        assert_eq!(index.paths(Level::Province).len(), 2);
        assert_eq!(index.paths(Level::District).len(), 3);
        assert!(index.paths(Level::National).is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(AggregationIndex::from_slice(b"[1, 2, 3]").is_err());
        assert!(AggregationIndex::from_slice(b"{}").unwrap().is_empty());
    }
}
