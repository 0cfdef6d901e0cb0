//! Risk polygons of one advisory, coloured by severity.

use std::fmt;

use geo::{MultiPolygon, Rect};

use crate::geom::Geometries;
use crate::types::Severity;

/// One drawable risk polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardZone {
    pub name: String,
    pub severity: Severity,
    pub fill_color: &'static str,
}

/// Hazard overlay for an advisory. Only zones with a fill color are kept, so
/// low-risk (green) areas never reach the map.
#[derive(Clone)]
pub struct HazardLayer {
    zones: Vec<HazardZone>,
    geoms: Geometries,
    /// Forecast day the polygons were taken from, as reported by the server
    pub critical_day: Option<String>,
}

impl HazardLayer {
    pub fn new(zones: Vec<HazardZone>, shapes: Vec<MultiPolygon<f64>>, critical_day: Option<String>) -> Self {
        debug_assert_eq!(zones.len(), shapes.len());
        Self { zones, geoms: Geometries::new(shapes), critical_day }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), None)
    }

    #[inline] pub fn len(&self) -> usize { self.zones.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.zones.is_empty() }
    #[inline] pub fn zones(&self) -> &[HazardZone] { &self.zones }

    /// Zones with their shapes, in drawing order.
    pub fn iter(&self) -> impl Iterator<Item = (&HazardZone, &MultiPolygon<f64>)> {
        self.zones.iter().enumerate()
            .filter_map(|(idx, zone)| Some((zone, self.geoms.shape(idx)?)))
    }

    /// Viewport fit target covering every zone.
    #[inline] pub fn bounds(&self) -> Option<Rect<f64>> { self.geoms.bounds() }

    /// Number of zones at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.zones.iter().filter(|z| z.severity == severity).count()
    }
}

impl Default for HazardLayer {
    fn default() -> Self { Self::empty() }
}

impl fmt::Debug for HazardLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HazardLayer")
            .field("zones", &self.zones.len())
            .field("critical_day", &self.critical_day)
            .finish()
    }
}
