use std::sync::Arc;

use rstar::{RTree, AABB};

use crate::feature::{Feature, Sector};
use crate::geom::BoundingBox;
use crate::table::FeatureTable;

/// Read-only slice of the authoritative table holding one sector's rows,
/// in ascending id order, with its own spatial index.
#[derive(Debug, Clone)]
pub struct SectorView {
    sector: Sector,
    table: Arc<FeatureTable>,
    rows: Vec<usize>, // Positions into table.features()
    rtree: RTree<BoundingBox>,
}

impl SectorView {
    /// Select every row of `table` whose sector is `sector`.
    pub(crate) fn select(table: &Arc<FeatureTable>, sector: Sector) -> Self {
        let rows: Vec<usize> = table.features().iter().enumerate()
            .filter(|(_, feature)| feature.sector == sector)
            .map(|(pos, _)| pos)
            .collect();

        // Geometries were checked when the table was built.
        let boxes = rows.iter().enumerate()
            .filter_map(|(i, &pos)| BoundingBox::of(i, &table.features()[pos].geometry))
            .collect();

        Self { sector, table: Arc::clone(table), rows, rtree: RTree::bulk_load(boxes) }
    }

    #[inline] pub fn sector(&self) -> Sector { self.sector }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Rows in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.rows.iter().map(|&pos| &self.table.features()[pos])
    }

    /// Rows whose bounding rectangles intersect `envelope`.
    pub fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = &Feature> + '_ {
        self.rtree.locate_in_envelope_intersecting(envelope)
            .map(|bb| &self.table.features()[self.rows[bb.idx()]])
    }

    /// Total area of the view in hectares.
    pub fn area_ha(&self) -> f64 {
        self.iter().fold(0.0, |acc, feature| acc + feature.area_ha)
    }
}

/// The four sector views of one authoritative table.
#[derive(Debug, Clone)]
pub struct SectorViews {
    views: [SectorView; 4],
}

impl SectorViews {
    pub(crate) fn build(table: &Arc<FeatureTable>) -> Self {
        Self { views: Sector::ALL.map(|sector| SectorView::select(table, sector)) }
    }

    /// View for a classified sector; `None` for `Unclassified`.
    pub fn get(&self, sector: Sector) -> Option<&SectorView> {
        sector.slot().map(|slot| &self.views[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectorView> + '_ { self.views.iter() }
}
