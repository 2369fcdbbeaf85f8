use geo::{Area, BooleanOps, BoundingRect, MultiPolygon, Polygon};

use crate::geom::Boundary;

/// Shape of a feature's intersection with the boundary set.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipOutcome {
    /// The intersection is one simple polygon.
    SinglePart(Polygon<f64>),
    /// The intersection has several parts, e.g. a feature straddling a boundary seam.
    MultiPart(MultiPolygon<f64>),
    /// Nothing of positive area survives.
    Empty,
}

impl ClipOutcome {
    /// Classify a raw intersection, treating parts with area `<= min_part_area` as degenerate.
    pub fn from_intersection(raw: MultiPolygon<f64>, min_part_area: f64) -> Self {
        let mut parts: Vec<Polygon<f64>> = raw.0.into_iter()
            .filter(|part| part.unsigned_area() > min_part_area)
            .collect();

        match parts.len() {
            0 => ClipOutcome::Empty,
            1 => ClipOutcome::SinglePart(parts.remove(0)),
            _ => ClipOutcome::MultiPart(MultiPolygon(parts)),
        }
    }

    #[inline] pub fn is_empty(&self) -> bool { matches!(self, ClipOutcome::Empty) }
}

/// Intersect `geometry` with the boundary set.
pub fn clip(geometry: &MultiPolygon<f64>, boundary: &Boundary, min_part_area: f64) -> ClipOutcome {
    let Some(rect) = geometry.bounding_rect() else { return ClipOutcome::Empty };

    // Parts whose boxes miss the feature cannot contribute to the intersection.
    let (subset, _) = boundary.candidates(&rect);
    if subset.0.is_empty() { return ClipOutcome::Empty }

    ClipOutcome::from_intersection(geometry.intersection(&subset), min_part_area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Rect;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Rect::new((x0, y0), (x1, y1)).to_polygon()
    }

    /// Two boundary parts separated by a gap between x=10 and x=12.
    fn seamed_boundary() -> Boundary {
        Boundary::new(MultiPolygon(vec![
            square(0.0, 0.0, 10.0, 10.0),
            square(12.0, 0.0, 22.0, 10.0),
        ])).unwrap()
    }

    #[test]
    fn straddling_one_edge_gives_single_part() {
        let feature = MultiPolygon(vec![square(-2.0, 2.0, 4.0, 4.0)]);
        match clip(&feature, &seamed_boundary(), 0.0) {
            ClipOutcome::SinglePart(poly) => assert!((poly.unsigned_area() - 8.0).abs() < 1e-9),
            other => panic!("expected single part, got {other:?}"),
        }
    }

    #[test]
    fn straddling_a_seam_gives_multi_part() {
        let feature = MultiPolygon(vec![square(8.0, 2.0, 14.0, 4.0)]);
        match clip(&feature, &seamed_boundary(), 0.0) {
            ClipOutcome::MultiPart(mp) => {
                assert_eq!(mp.0.len(), 2);
                assert!((mp.unsigned_area() - 8.0).abs() < 1e-9);
            }
            other => panic!("expected multi part, got {other:?}"),
        }
    }

    #[test]
    fn touching_only_clips_to_empty() {
        let feature = MultiPolygon(vec![square(-4.0, 2.0, 0.0, 4.0)]);
        assert!(clip(&feature, &seamed_boundary(), 0.0).is_empty());
    }

    #[test]
    fn far_away_clips_to_empty() {
        let feature = MultiPolygon(vec![square(50.0, 50.0, 52.0, 52.0)]);
        assert!(clip(&feature, &seamed_boundary(), 0.0).is_empty());
    }

    #[test]
    fn small_parts_below_threshold_are_degenerate() {
        let raw = MultiPolygon(vec![square(0.0, 0.0, 1.0, 1.0), square(5.0, 5.0, 6.0, 8.0)]);
        assert!(matches!(ClipOutcome::from_intersection(raw.clone(), 2.0), ClipOutcome::SinglePart(_)));
        assert!(ClipOutcome::from_intersection(raw, 5.0).is_empty());
    }
}
