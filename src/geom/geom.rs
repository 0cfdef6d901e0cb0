use geo::{BoundingRect, Contains, Coord, MultiPolygon, Point, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// A feature's bounding rectangle tagged with the feature index.
type IndexedBounds = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// The shapes of one boundary layer, with an R-tree over their bounding boxes.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    bounds: Vec<Option<Rect<f64>>>,
    rtree: RTree<IndexedBounds>,
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes get no bounding box and never match a spatial query.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>) -> Self {
        let bounds: Vec<Option<Rect<f64>>> = shapes.iter().map(|mp| mp.bounding_rect()).collect();
        Self {
            rtree: RTree::bulk_load(
                bounds.iter().enumerate()
                    .filter_map(|(i, bbox)| bbox.map(|b| {
                        let corners = Rectangle::from_corners([b.min().x, b.min().y], [b.max().x, b.max().y]);
                        IndexedBounds::new(corners, i)
                    }))
                    .collect()
            ),
            shapes,
            bounds,
        }
    }

    #[inline] pub(crate) fn shape(&self, idx: usize) -> Option<&MultiPolygon<f64>> { self.shapes.get(idx) }

    /// Bounding rectangle of one shape.
    #[inline] pub(crate) fn bounds_of(&self, idx: usize) -> Option<Rect<f64>> { self.bounds.get(idx).copied().flatten() }

    /// Compute the bounding rectangle of all shapes.
    pub(crate) fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds.iter()
            .flatten()
            .copied()
            .reduce(|a, b| Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                }
            ))
    }

    /// First shape containing `point` (lon, lat).
    pub(crate) fn locate(&self, point: Point<f64>) -> Option<usize> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        let mut candidates: Vec<usize> = self.rtree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect();
        candidates.sort_unstable();
        candidates.into_iter().find(|&idx| self.shapes[idx].contains(&point))
    }
}
