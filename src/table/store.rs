use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::PipelineError;
use crate::feature::Feature;
use crate::pipeline::{Pipeline, RunReport};
use crate::table::{FeatureTable, SectorViews};

/// Result of one complete pipeline run: the authoritative table, its sector
/// views, and the run counters.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub table: Arc<FeatureTable>,
    pub views: SectorViews,
    pub report: RunReport,
}

/// Holds the currently published snapshot. A rebuild is invisible to readers
/// until it has fully succeeded; a failed rebuild leaves the previous one in place.
#[derive(Debug, Default)]
pub struct FeatureStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl FeatureStore {
    pub fn new() -> Self { Self::default() }

    /// The published snapshot, if any run has succeeded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// Run the pipeline over `features` and publish the result.
    pub fn rebuild(&self, pipeline: &Pipeline, features: Vec<Feature>) -> Result<Arc<Snapshot>, PipelineError> {
        let snapshot = Arc::new(pipeline.run(features)?);
        self.publish(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Swap in a fully built snapshot.
    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        info!("[store] publishing authoritative table with {} features", snapshot.table.len());
        *self.current.write() = Some(snapshot);
    }
}
