use std::fmt;

use ahash::AHashMap;
use geo::{MultiPolygon, Point, Rect};
use tracing::debug;

use crate::geom::Geometries;
use crate::types::{Level, PlaceName};

/// Parent names a feature carries, by level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParentRefs {
    pub department: Option<PlaceName>,
    pub province: Option<PlaceName>,
}

impl ParentRefs {
    pub fn get(&self, level: Level) -> Option<&PlaceName> {
        match level {
            Level::Department => self.department.as_ref(),
            Level::Province => self.province.as_ref(),
            Level::National | Level::District => None,
        }
    }
}

/// Join key between a boundary feature and the selection: the feature's own
/// name plus whichever parent names apply at its level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey {
    pub department: Option<PlaceName>,
    pub province: Option<PlaceName>,
    pub name: PlaceName,
}

impl JoinKey {
    /// Keep only the parents meaningful at `level`.
    pub fn new(level: Level, name: PlaceName, parents: &ParentRefs) -> Self {
        let department = if level >= Level::Province { parents.department.clone() } else { None };
        let province = if level >= Level::District { parents.province.clone() } else { None };
        Self { department, province, name }
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for parent in [&self.department, &self.province].into_iter().flatten() {
            write!(f, "{parent}/")?;
        }
        write!(f, "{}", self.name)
    }
}

/// A named administrative unit at one level.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub name: PlaceName,
    pub parents: ParentRefs,
}

/// Geometry collection for one administrative level, indexed by join key.
pub struct BoundaryLayer {
    pub ty: Level,
    features: Vec<BoundaryFeature>,
    index: AHashMap<JoinKey, usize>, // Map between join keys and feature indices
    geoms: Geometries,
}

impl BoundaryLayer {
    /// Build a layer from features and their shapes (same length, same order).
    /// When two features share a join key the first one wins.
    pub fn new(ty: Level, features: Vec<BoundaryFeature>, shapes: Vec<MultiPolygon<f64>>) -> Self {
        debug_assert_eq!(features.len(), shapes.len());
        let mut index = AHashMap::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            let key = JoinKey::new(ty, feature.name.clone(), &feature.parents);
            if index.contains_key(&key) {
                debug!(level = %ty, key = %key, "duplicate boundary feature ignored for lookup");
                continue;
            }
            index.insert(key, idx);
        }
        Self { ty, features, index, geoms: Geometries::new(shapes) }
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }
    #[inline] pub fn feature(&self, idx: usize) -> Option<&BoundaryFeature> { self.features.get(idx) }
    #[inline] pub fn bounds_of(&self, idx: usize) -> Option<Rect<f64>> { self.geoms.bounds_of(idx) }

    /// Find a feature by normalized name and parents.
    pub fn find(&self, key: &JoinKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Like [`find`](Self::find), but also accepts a same-named feature whose
    /// parent properties are missing from the source data.
    pub fn find_compatible(&self, key: &JoinKey) -> Option<usize> {
        self.find(key).or_else(|| {
            self.features.iter().position(|f| {
                f.name == key.name
                    && f.parents.department.as_ref().is_none_or(|d| key.department.as_ref() == Some(d))
                    && f.parents.province.as_ref().is_none_or(|p| key.province.as_ref() == Some(p))
            })
        })
    }

    /// First `n` feature names, for mismatch diagnostics.
    pub fn sample_names(&self, n: usize) -> Vec<&str> {
        self.features.iter().take(n).map(|f| f.name.as_str()).collect()
    }

    /// Feature whose shape contains `point` (lon, lat).
    pub fn feature_at(&self, point: Point<f64>) -> Option<&BoundaryFeature> {
        self.geoms.locate(point).and_then(|idx| self.features.get(idx))
    }
}

impl fmt::Debug for BoundaryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show_all = f.alternate();
        let preview: Vec<&str> = if show_all { self.sample_names(5) } else { Vec::new() };

        let mut dbg = f.debug_struct("BoundaryLayer");
        dbg.field("ty", &self.ty)
            .field("features", &self.features.len())
            .field("index_size", &self.index.len());
        if show_all {
            dbg.field("names", &preview);
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon, Point};

    use super::*;

    fn name(s: &str) -> PlaceName { PlaceName::new(s).unwrap() }

    fn square(x0: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x0, y: 0.0), (x: x0 + 1.0, y: 0.0), (x: x0 + 1.0, y: 1.0), (x: x0, y: 1.0), (x: x0, y: 0.0)]])
    }

    fn provinces() -> BoundaryLayer {
        let feature = |prov: &str, dept: &str| BoundaryFeature {
            name: name(prov),
            parents: ParentRefs { department: Some(name(dept)), province: None },
        };
        BoundaryLayer::new(
            Level::Province,
            vec![feature("LIMA", "LIMA"), feature("HUAURA", "LIMA"), feature("LIMA", "OTRO")],
            vec![square(0.0), square(1.0), square(5.0)],
        )
    }

    #[test]
    fn find_uses_parent_names() {
        let layer = provinces();
        let parents = ParentRefs { department: Some(name("LIMA")), province: None };
        assert_eq!(layer.find(&JoinKey::new(Level::Province, name("HUAURA"), &parents)), Some(1));
        assert_eq!(layer.find(&JoinKey::new(Level::Province, name("LIMA"), &parents)), Some(0));

        let other = ParentRefs { department: Some(name("OTRO")), province: None };
        assert_eq!(layer.find(&JoinKey::new(Level::Province, name("LIMA"), &other)), Some(2));
        assert_eq!(layer.find(&JoinKey::new(Level::Province, name("HUAURA"), &other)), None);
    }

    #[test]
    fn department_keys_ignore_parents() {
        let parents = ParentRefs { department: Some(name("X")), province: Some(name("Y")) };
        let key = JoinKey::new(Level::Department, name("LIMA"), &parents);
        assert_eq!(key.department, None);
        assert_eq!(key.province, None);
        assert_eq!(key.to_string(), "LIMA");
        assert_eq!(JoinKey::new(Level::District, name("MALA"), &parents).to_string(), "X/Y/MALA");
    }

    #[test]
    fn compatible_lookup_tolerates_missing_parents() {
        let layer = BoundaryLayer::new(
            Level::District,
            vec![
                BoundaryFeature { name: name("MALA"), parents: ParentRefs::default() },
                BoundaryFeature { name: name("ASIA"), parents: ParentRefs { department: Some(name("ICA")), province: None } },
            ],
            vec![square(0.0), square(1.0)],
        );
        let parents = ParentRefs { department: Some(name("LIMA")), province: Some(name("CAÑETE")) };
        let mala = JoinKey::new(Level::District, name("MALA"), &parents);
        assert_eq!(layer.find(&mala), None);
        assert_eq!(layer.find_compatible(&mala), Some(0));
        assert_eq!(layer.find_compatible(&JoinKey::new(Level::District, name("ASIA"), &parents)), None);
    }

    #[test]
    fn point_lookup() {
        let layer = provinces();
        assert_eq!(layer.feature_at(Point::new(1.5, 0.5)).map(|f| f.name.as_str()), Some("HUAURA"));
        assert!(layer.feature_at(Point::new(3.5, 0.5)).is_none());
        assert_eq!(layer.sample_names(2), vec!["LIMA", "HUAURA"]);
    }
}
