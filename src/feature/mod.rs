mod sector;

use std::{collections::BTreeMap, fmt, sync::Arc};

use geo::{Geometry, MultiPolygon};
use serde::{Deserialize, Serialize};

pub use sector::Sector;

/// Free-form attribute tags of a feature (`landuse=residential`, ...).
/// Only read by the classifier; never mutated after ingestion.
pub type Tags = BTreeMap<String, String>;

/// Identity of a feature in the authoritative table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.0)
    }
}

/// Topological relation of a feature to the boundary set.
/// Transient: only meaningful between relation resolution and the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryRelation {
    #[default]
    Outside,
    Inside,
    Crossing,
}

/// One land-use polygon.
#[derive(Debug, Clone)]
pub struct Feature {
    pub id: FeatureId,
    pub source_id: i64,         // Originating external record, shared by clip descendants
    pub name: Option<Arc<str>>,
    pub sector: Sector,
    pub area_ha: f64,           // Equal-area projection, recomputed on geometry change
    pub tags: Arc<Tags>,
    pub relation: BoundaryRelation,
    pub geometry: MultiPolygon<f64>,
}

impl Feature {
    /// Derive a descendant that replaces this feature's geometry and identity.
    /// Tags, name, source id and the current sector are carried over.
    pub(crate) fn descendant(&self, id: FeatureId, geometry: MultiPolygon<f64>, area_ha: f64) -> Self {
        Self {
            id,
            source_id: self.source_id,
            name: self.name.clone(),
            sector: self.sector,
            area_ha,
            tags: Arc::clone(&self.tags),
            relation: BoundaryRelation::Inside,
            geometry,
        }
    }
}

/// A record as delivered by the external loader, before eligibility filtering,
/// geometry normalization, and reprojection.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub id: Option<FeatureId>,
    pub source_id: i64,
    pub name: Option<String>,
    pub tags: Tags,
    pub geometry: Geometry<f64>,
}
