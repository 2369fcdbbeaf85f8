use ahash::AHashMap;
use rstar::{RTree, AABB};

use crate::error::PipelineError;
use crate::feature::{Feature, FeatureId};
use crate::geom::BoundingBox;

/// The authoritative feature table: features ordered by ascending id,
/// with an id index and an R-tree over their bounding rectangles.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    features: Vec<Feature>,
    index: AHashMap<FeatureId, usize>,
    rtree: RTree<BoundingBox>,
}

impl FeatureTable {
    /// Build a table, rejecting duplicate ids and geometries without a bounding rectangle.
    pub fn build(mut features: Vec<Feature>) -> Result<Self, PipelineError> {
        features.sort_by_key(|feature| feature.id);

        let mut index = AHashMap::with_capacity(features.len());
        let mut boxes = Vec::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            if index.insert(feature.id, i).is_some() {
                return Err(PipelineError::IdentityCollision(feature.id));
            }
            let bbox = BoundingBox::of(i, &feature.geometry)
                .ok_or_else(|| PipelineError::InvalidGeometry {
                    source_id: feature.source_id,
                    reason: format!("{} has no bounding rectangle", feature.id),
                })?;
            boxes.push(bbox);
        }

        Ok(Self { features, index, rtree: RTree::bulk_load(boxes) })
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    /// Features in ascending id order.
    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    #[inline] pub fn iter(&self) -> impl Iterator<Item = &Feature> + '_ { self.features.iter() }

    /// Look up a feature by id.
    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.index.get(&id).map(|&i| &self.features[i])
    }

    #[inline] pub fn contains(&self, id: FeatureId) -> bool { self.index.contains_key(&id) }

    /// Features whose bounding rectangles intersect `envelope`.
    pub fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &Feature> + '_ {
        self.rtree.locate_in_envelope_intersecting(envelope)
            .map(|bb| &self.features[bb.idx()])
    }

    /// Mutable access before the table is frozen behind an `Arc`.
    /// Geometry must not change, or the R-tree goes stale.
    pub(crate) fn features_mut(&mut self) -> &mut [Feature] { &mut self.features }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{BoundaryRelation, Sector};
    use geo::{MultiPolygon, Rect};

    fn feature(id: u64, x: f64) -> Feature {
        Feature {
            id: FeatureId(id),
            source_id: id as i64,
            name: None,
            sector: Sector::Unclassified,
            area_ha: 1.0,
            tags: Default::default(),
            relation: BoundaryRelation::Inside,
            geometry: MultiPolygon(vec![Rect::new((x, 0.0), (x + 1.0, 1.0)).to_polygon()]),
        }
    }

    #[test]
    fn build_sorts_by_id() {
        let table = FeatureTable::build(vec![feature(5, 0.0), feature(2, 2.0), feature(9, 4.0)]).unwrap();
        let ids: Vec<u64> = table.iter().map(|f| f.id.0).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert_eq!(table.get(FeatureId(5)).map(|f| f.source_id), Some(5));
        assert!(table.get(FeatureId(3)).is_none());
    }

    #[test]
    fn duplicate_ids_are_a_collision() {
        let err = FeatureTable::build(vec![feature(1, 0.0), feature(1, 2.0)]).unwrap_err();
        assert!(matches!(err, PipelineError::IdentityCollision(FeatureId(1))));
    }

    #[test]
    fn empty_geometry_is_not_indexable() {
        let mut broken = feature(1, 0.0);
        broken.geometry = MultiPolygon(vec![]);
        assert!(matches!(FeatureTable::build(vec![broken]), Err(PipelineError::InvalidGeometry { .. })));
    }

    #[test]
    fn query_uses_bounding_rectangles() {
        let table = FeatureTable::build(vec![feature(1, 0.0), feature(2, 10.0), feature(3, 20.0)]).unwrap();
        let hits: Vec<u64> = table.query(&AABB::from_corners([9.0, 0.0], [12.0, 1.0]))
            .map(|f| f.id.0)
            .collect();
        assert_eq!(hits, vec![2]);
    }
}
