use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classify::{ClassifierRule, TagClassifier};

/// PROJ.4 definition of WGS84 lon/lat, the usual CRS of harvested map features.
pub const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// PROJ.4 definition of ETRS89 / LAEA Europe (EPSG:3035), an equal-area CRS in meters.
pub const ETRS89_LAEA_PROJ4: &str =
    "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80 +units=m +no_defs +type=crs";

/// Settings for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CRS of loader geometries; `None` if they are already in `target_crs`.
    pub source_crs: Option<String>,
    /// Fixed equal-area CRS every persisted geometry is expressed in.
    /// `Pipeline` expects its boundary set in this CRS.
    pub target_crs: String,
    /// Polygon parts with an area at or below this (m²) are degenerate.
    pub min_part_area_m2: f64,
    /// Worker threads for per-feature stages; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Replacement rule table; `None` uses the built-in table.
    pub rules: Option<Vec<ClassifierRule>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_crs: Some(WGS84_PROJ4.to_string()),
            target_crs: ETRS89_LAEA_PROJ4.to_string(),
            min_part_area_m2: 0.0,
            threads: None,
            rules: None,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file. Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Classifier built from the configured rule table.
    pub fn classifier(&self) -> TagClassifier {
        match &self.rules {
            Some(rules) => TagClassifier::new(rules.clone()),
            None => TagClassifier::default(),
        }
    }
}
