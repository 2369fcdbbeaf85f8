use geo::{Area, BooleanOps, MultiPolygon, Polygon, Rect};
use rstar::{RTree, AABB};

use crate::error::PipelineError;
use crate::geom::bbox::{envelope, merge_rects, BoundingBox};
use crate::geom::check_validity;

/// The national outline: a read-only multi-polygon in the target CRS,
/// indexed by part so features are only related to the parts near them.
#[derive(Debug, Clone)]
pub struct Boundary {
    parts: Vec<Polygon<f64>>,
    rtree: RTree<BoundingBox>,
    bounds: Rect<f64>,
}

impl Boundary {
    /// Wrap a pre-dissolved boundary. Zero-area parts are ignored; what
    /// remains must be a valid multi-polygon.
    pub fn new(geometry: MultiPolygon<f64>) -> Result<Self, PipelineError> {
        let parts: Vec<Polygon<f64>> = geometry.0.into_iter()
            .filter(|part| part.unsigned_area() > 0.0)
            .collect();
        if parts.is_empty() { return Err(PipelineError::EmptyBoundary) }

        let parts = MultiPolygon(parts);
        check_validity(&parts).map_err(PipelineError::InvalidBoundary)?;
        let parts = parts.0;

        let boxes: Vec<BoundingBox> = parts.iter().enumerate()
            .filter_map(|(i, part)| BoundingBox::of(i, &MultiPolygon(vec![part.clone()])))
            .collect();

        let bounds = boxes.iter()
            .map(|b| *b.bbox())
            .reduce(merge_rects)
            .ok_or(PipelineError::EmptyBoundary)?;

        Ok(Self { parts, rtree: RTree::bulk_load(boxes), bounds })
    }

    /// Union a list of boundary pieces into one boundary set.
    /// This may be slow for large numbers of complex polygons.
    pub fn dissolve(pieces: Vec<MultiPolygon<f64>>) -> Result<Self, PipelineError> {
        let merged = pieces.into_iter()
            .reduce(|a, b| a.union(&b))
            .ok_or(PipelineError::EmptyBoundary)?;
        Self::new(merged)
    }

    #[inline] pub fn parts(&self) -> &[Polygon<f64>] { &self.parts }

    /// Bounding rectangle of the whole boundary set.
    #[inline] pub fn bounds(&self) -> Rect<f64> { self.bounds }

    /// Total area in m².
    pub fn area(&self) -> f64 {
        self.parts.iter().map(|part| part.unsigned_area()).sum()
    }

    /// Parts whose bounding boxes intersect `rect`, as one multi-polygon.
    /// Returns the number of parts left out alongside it.
    pub(crate) fn candidates(&self, rect: &Rect<f64>) -> (MultiPolygon<f64>, usize) {
        let env: AABB<[f64; 2]> = envelope(rect);
        let mut idxs: Vec<usize> = self.rtree.locate_in_envelope_intersecting(&env)
            .map(|b| b.idx())
            .collect();
        idxs.sort_unstable();

        let excluded = self.parts.len() - idxs.len();
        let subset = MultiPolygon(idxs.into_iter().map(|i| self.parts[i].clone()).collect());
        (subset, excluded)
    }
}
