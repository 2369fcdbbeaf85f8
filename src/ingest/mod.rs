//! Turns loader records into features the pipeline can work with: only
//! records in the eligible universe, geometry as a clean multi-polygon in
//! the target CRS, area computed, identity assigned.

use std::sync::Arc;

use ahash::AHashSet;
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::TagClassifier;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::feature::{BoundaryRelation, Feature, FeatureId, RawFeature, Sector};
use crate::geom::{area_ha, check_structure, check_validity, clean_parts, to_multipolygon, Projector};
use crate::pipeline::IdAllocator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub records: usize,
    pub eligible: usize,
    pub ineligible: usize,
}

pub struct Ingestor {
    classifier: TagClassifier,
    projector: Projector,
    min_part_area: f64,
}

impl Ingestor {
    pub fn new(classifier: TagClassifier, projector: Projector) -> Self {
        Self { classifier, projector, min_part_area: 0.0 }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            classifier: config.classifier(),
            projector: Projector::new(config.source_crs.as_deref(), &config.target_crs)?,
            min_part_area: config.min_part_area_m2,
        })
    }

    /// Filter, normalize, reproject, and identify loader records.
    /// Any invalid geometry or duplicate supplied id aborts the whole batch.
    pub fn ingest(&self, records: Vec<RawFeature>) -> Result<(Vec<Feature>, IngestStats), PipelineError> {
        let mut stats = IngestStats { records: records.len(), ..Default::default() };

        let eligible: Vec<RawFeature> = records.into_iter()
            .filter(|record| {
                let keep = self.classifier.is_eligible(&record.tags);
                if !keep { debug!("[ingest] source record {} matches no sector, skipped", record.source_id); }
                keep
            })
            .collect();
        stats.eligible = eligible.len();
        stats.ineligible = stats.records - stats.eligible;

        let mut supplied = AHashSet::with_capacity(eligible.len());
        for id in eligible.iter().filter_map(|record| record.id) {
            if !supplied.insert(id) {
                return Err(PipelineError::IdentityCollision(id));
            }
        }
        let ids = IdAllocator::after(supplied.iter());

        let features = eligible.into_iter()
            .map(|record| {
                let id = record.id.unwrap_or_else(|| ids.allocate());
                self.prepare(id, record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("[ingest] {} records, {} eligible", stats.records, stats.eligible);
        Ok((features, stats))
    }

    fn prepare(&self, id: FeatureId, record: RawFeature) -> Result<Feature, PipelineError> {
        let source_id = record.source_id;
        let invalid = |reason: String| PipelineError::InvalidGeometry { source_id, reason };

        let geometry = to_multipolygon(record.geometry).map_err(invalid)?;
        check_structure(&geometry).map_err(invalid)?;

        let geometry = clean_parts(self.projector.project(source_id, geometry)?, self.min_part_area);
        if geometry.0.is_empty() {
            return Err(invalid("no polygon part with positive area".to_string()));
        }
        check_validity(&geometry).map_err(invalid)?;

        Ok(Feature {
            id,
            source_id,
            name: record.name.map(Arc::from),
            sector: Sector::Unclassified,
            area_ha: area_ha(&geometry),
            tags: Arc::new(record.tags),
            relation: BoundaryRelation::Outside,
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Tags;
    use geo::{point, polygon, Geometry, Rect};

    fn record(id: Option<u64>, landuse: &str, geometry: Geometry<f64>) -> RawFeature {
        let tags: Tags = [("landuse".to_string(), landuse.to_string())].into();
        RawFeature { id: id.map(FeatureId), source_id: 7, name: Some("Nordpark".into()), tags, geometry }
    }

    fn square() -> Geometry<f64> {
        Geometry::Polygon(Rect::new((0.0, 0.0), (100.0, 100.0)).to_polygon())
    }

    fn ingestor() -> Ingestor {
        Ingestor::new(TagClassifier::default(), Projector::identity())
    }

    #[test]
    fn self_intersecting_polygons_are_rejected() {
        let bowtie = polygon![(x: 80.0, y: 10.0), (x: 120.0, y: 40.0), (x: 120.0, y: 10.0), (x: 80.0, y: 20.0), (x: 80.0, y: 10.0)];
        let err = ingestor().ingest(vec![record(None, "industrial", Geometry::Polygon(bowtie))]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidGeometry { source_id: 7, .. }));
    }

    #[test]
    fn ineligible_records_are_skipped() {
        let (features, stats) = ingestor().ingest(vec![
            record(None, "residential", square()),
            record(None, "forest", square()),
        ]).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(stats, IngestStats { records: 2, eligible: 1, ineligible: 1 });
    }

    #[test]
    fn features_are_normalized_and_measured() {
        let (features, _) = ingestor().ingest(vec![record(Some(3), "retail", square())]).unwrap();
        let feature = &features[0];
        assert_eq!(feature.id, FeatureId(3));
        assert_eq!(feature.geometry.0.len(), 1);
        assert!((feature.area_ha - 1.0).abs() < 1e-12);
        assert_eq!(feature.sector, Sector::Unclassified);
        assert_eq!(feature.name.as_deref(), Some("Nordpark"));
    }

    #[test]
    fn missing_ids_are_allocated_past_supplied_ones() {
        let (features, _) = ingestor().ingest(vec![
            record(None, "residential", square()),
            record(Some(40), "residential", square()),
            record(None, "residential", square()),
        ]).unwrap();
        let ids: Vec<u64> = features.iter().map(|f| f.id.0).collect();
        assert_eq!(ids, vec![41, 40, 42]);
    }

    #[test]
    fn duplicate_supplied_ids_abort() {
        let err = ingestor().ingest(vec![
            record(Some(4), "residential", square()),
            record(Some(4), "port", square()),
        ]).unwrap_err();
        assert!(matches!(err, PipelineError::IdentityCollision(FeatureId(4))));
    }

    #[test]
    fn non_areal_geometry_aborts() {
        let err = ingestor().ingest(vec![record(None, "port", Geometry::Point(point!(x: 1.0, y: 1.0)))]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidGeometry { source_id: 7, .. }));
    }

    #[test]
    fn zero_area_geometry_aborts() {
        let flat = Geometry::Polygon(geo::polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]);
        assert!(matches!(
            ingestor().ingest(vec![record(None, "port", flat)]),
            Err(PipelineError::InvalidGeometry { .. })
        ));
    }
}
