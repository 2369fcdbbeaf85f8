use geo::{BoundingRect, Intersects, MultiPolygon, Relate};
use rayon::prelude::*;
use tracing::debug;

use crate::error::PipelineError;
use crate::feature::{BoundaryRelation, Feature, FeatureId};
use crate::geom::{check_validity, Boundary};

// DE-9IM masks, feature relative to boundary.
const INTERIORS_MEET: &str = "T********";
const FEATURE_INTERIOR_OUTSIDE: &str = "**T******";
const BOUNDARY_INTERIOR_OUTSIDE: &str = "******T**";

fn relate_error<E: std::fmt::Display>(id: FeatureId) -> impl Fn(E) -> PipelineError {
    move |e| PipelineError::Relate { id, reason: e.to_string() }
}

/// Boundary parts near `geometry`, or `None` if the bounding volumes are disjoint.
fn nearby(geometry: &MultiPolygon<f64>, boundary: &Boundary) -> Option<(MultiPolygon<f64>, usize)> {
    let rect = geometry.bounding_rect()?;
    if !rect.intersects(&boundary.bounds()) { return None }

    let (subset, excluded) = boundary.candidates(&rect);
    (!subset.0.is_empty()).then_some((subset, excluded))
}

/// Full containment, boundary-inclusive: the feature lies within the boundary set.
pub fn is_contained(geometry: &MultiPolygon<f64>, boundary: &Boundary) -> bool {
    // A feature is within the whole boundary iff it is within the parts near it.
    nearby(geometry, boundary)
        .is_some_and(|(subset, _)| geometry.relate(&subset).is_within())
}

/// Partial areal intersection, neither geometry containing the other.
pub fn is_overlapping(id: FeatureId, geometry: &MultiPolygon<f64>, boundary: &Boundary) -> Result<bool, PipelineError> {
    let Some((subset, excluded)) = nearby(geometry, boundary) else { return Ok(false) };

    let im = geometry.relate(&subset);
    if !im.matches(INTERIORS_MEET).map_err(relate_error(id))? { return Ok(false) }
    if !im.matches(FEATURE_INTERIOR_OUTSIDE).map_err(relate_error(id))? { return Ok(false) }

    // Parts outside the candidate set never touch the feature, so they always
    // leave boundary interior outside of it.
    Ok(excluded > 0 || im.matches(BOUNDARY_INTERIOR_OUTSIDE).map_err(relate_error(id))?)
}

/// Relation of a single geometry to the boundary set. Containment is tested first.
pub fn resolve(id: FeatureId, geometry: &MultiPolygon<f64>, boundary: &Boundary) -> Result<BoundaryRelation, PipelineError> {
    if is_contained(geometry, boundary) {
        return Ok(BoundaryRelation::Inside)
    }
    if is_overlapping(id, geometry, boundary)? {
        return Ok(BoundaryRelation::Crossing)
    }
    Ok(BoundaryRelation::Outside)
}

/// Annotate every feature with its boundary relation, in two passes:
/// validity and containment over all features, then overlap over those
/// still outside. Any invalid feature aborts the run.
pub fn resolve_all(features: &mut [Feature], boundary: &Boundary) -> Result<(), PipelineError> {
    features.par_iter_mut().try_for_each(|feature| {
        check_validity(&feature.geometry)
            .map_err(|reason| PipelineError::InvalidGeometry { source_id: feature.source_id, reason })?;
        feature.relation = if is_contained(&feature.geometry, boundary) {
            BoundaryRelation::Inside
        } else {
            BoundaryRelation::Outside
        };
        Ok::<(), PipelineError>(())
    })?;

    features.par_iter_mut()
        .filter(|feature| feature.relation == BoundaryRelation::Outside)
        .try_for_each(|feature| {
            if is_overlapping(feature.id, &feature.geometry, boundary)? {
                feature.relation = BoundaryRelation::Crossing;
            }
            Ok::<(), PipelineError>(())
        })?;

    debug!(
        "[resolve] {} features: {} inside, {} crossing",
        features.len(),
        features.iter().filter(|f| f.relation == BoundaryRelation::Inside).count(),
        features.iter().filter(|f| f.relation == BoundaryRelation::Crossing).count(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon, Rect};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new((x0, y0), (x1, y1)).to_polygon()])
    }

    fn boundary() -> Boundary {
        let parts: Vec<Polygon<f64>> = vec![
            Rect::new((0.0, 0.0), (10.0, 10.0)).to_polygon(),
            Rect::new((12.0, 0.0), (22.0, 10.0)).to_polygon(),
            Rect::new((100.0, 100.0), (110.0, 110.0)).to_polygon(),
        ];
        Boundary::new(MultiPolygon(parts)).unwrap()
    }

    fn relation(geometry: MultiPolygon<f64>) -> BoundaryRelation {
        resolve(FeatureId(1), &geometry, &boundary()).unwrap()
    }

    #[test]
    fn fully_inside() {
        assert_eq!(relation(square(2.0, 2.0, 4.0, 4.0)), BoundaryRelation::Inside);
    }

    #[test]
    fn inside_touching_the_edge_is_still_inside() {
        assert_eq!(relation(square(0.0, 2.0, 2.0, 4.0)), BoundaryRelation::Inside);
    }

    #[test]
    fn straddling_is_crossing() {
        assert_eq!(relation(square(-2.0, 2.0, 4.0, 4.0)), BoundaryRelation::Crossing);
        assert_eq!(relation(square(8.0, 2.0, 14.0, 4.0)), BoundaryRelation::Crossing);
    }

    #[test]
    fn disjoint_is_outside() {
        assert_eq!(relation(square(50.0, 50.0, 52.0, 52.0)), BoundaryRelation::Outside);
        assert_eq!(relation(square(10.5, 2.0, 11.5, 4.0)), BoundaryRelation::Outside);
    }

    #[test]
    fn touching_from_outside_is_outside() {
        assert_eq!(relation(square(-4.0, 2.0, 0.0, 4.0)), BoundaryRelation::Outside);
    }

    #[test]
    fn covering_a_whole_part_still_crosses_the_set() {
        // Swallows the first part entirely; the other parts keep the overlap partial.
        assert_eq!(relation(square(-1.0, -1.0, 11.0, 11.0)), BoundaryRelation::Crossing);
    }

    fn features(shapes: &[MultiPolygon<f64>]) -> Vec<Feature> {
        shapes.iter().enumerate()
            .map(|(i, geometry)| Feature {
                id: FeatureId(i as u64 + 1),
                source_id: i as i64,
                name: None,
                sector: Default::default(),
                area_ha: 1.0,
                tags: Default::default(),
                relation: BoundaryRelation::Outside,
                geometry: geometry.clone(),
            })
            .collect()
    }

    #[test]
    fn resolve_all_rejects_self_intersecting_features() {
        let bowtie = polygon![(x: 8.0, y: 1.0), (x: 12.0, y: 4.0), (x: 12.0, y: 1.0), (x: 8.0, y: 2.0), (x: 8.0, y: 1.0)];
        let mut features = features(&[square(2.0, 2.0, 4.0, 4.0), MultiPolygon(vec![bowtie])]);

        let err = resolve_all(&mut features, &boundary()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidGeometry { source_id: 1, .. }));
    }

    #[test]
    fn resolve_all_matches_single_resolution() {
        let b = boundary();
        let shapes = [
            square(2.0, 2.0, 4.0, 4.0),
            square(-2.0, 2.0, 4.0, 4.0),
            square(50.0, 50.0, 52.0, 52.0),
        ];
        let mut features = features(&shapes);

        resolve_all(&mut features, &b).unwrap();
        for feature in &features {
            assert_eq!(feature.relation, resolve(feature.id, &feature.geometry, &b).unwrap());
        }
        assert_eq!(features[0].relation, BoundaryRelation::Inside);
        assert_eq!(features[1].relation, BoundaryRelation::Crossing);
        assert_eq!(features[2].relation, BoundaryRelation::Outside);
    }
}
