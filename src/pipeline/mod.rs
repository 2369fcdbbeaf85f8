mod ids;
mod merge;
mod partition;
mod resolve;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::classify::TagClassifier;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::feature::{BoundaryRelation, Feature};
use crate::geom::{clip, Boundary};
use crate::table::{SectorViews, Snapshot};

pub use ids::IdAllocator;
pub use merge::{merge, Clipped, MergeStats};
pub use partition::partition;
pub use resolve::{is_contained, is_overlapping, resolve, resolve_all};

/// Per-sector totals of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SectorSummary {
    pub count: usize,
    pub area_ha: f64,
}

/// Counters of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub input: usize,
    pub inside: usize,
    pub crossing: usize,
    pub outside: usize,
    pub clipped_single: usize,
    pub clipped_multi: usize,
    pub dropped_degenerate: usize,
    pub authoritative: usize,
    pub unclassified: usize,
    pub sectors: BTreeMap<String, SectorSummary>,
}

impl RunReport {
    fn summarize(input: usize, merge: MergeStats, authoritative: usize, views: &SectorViews) -> Self {
        let sectors: BTreeMap<String, SectorSummary> = views.iter()
            .map(|view| (view.sector().to_str().to_string(), SectorSummary {
                count: view.len(),
                area_ha: view.area_ha(),
            }))
            .collect();
        let classified: usize = sectors.values().map(|s| s.count).sum();

        Self {
            input,
            inside: merge.kept_inside,
            crossing: merge.removed_crossing,
            outside: merge.removed_outside,
            clipped_single: merge.clipped_single,
            clipped_multi: merge.clipped_multi,
            dropped_degenerate: merge.dropped_degenerate,
            authoritative,
            unclassified: authoritative - classified,
            sectors,
        }
    }
}

/// Batch boundary-clipping and sector-partitioning job.
/// Each run recomputes everything from the given features.
pub struct Pipeline {
    boundary: Boundary,
    classifier: TagClassifier,
    min_part_area: f64,
    pool: Option<rayon::ThreadPool>,
}

impl Pipeline {
    /// Pipeline with the built-in rule table and the global rayon pool.
    pub fn new(boundary: Boundary) -> Self {
        Self { boundary, classifier: TagClassifier::default(), min_part_area: 0.0, pool: None }
    }

    /// Pipeline configured from `config`.
    pub fn from_config(config: &PipelineConfig, boundary: Boundary) -> Result<Self, PipelineError> {
        let pool = match config.threads {
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => None,
        };
        Ok(Self {
            boundary,
            classifier: config.classifier(),
            min_part_area: config.min_part_area_m2,
            pool,
        })
    }

    pub fn with_classifier(mut self, classifier: TagClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    #[inline] pub fn boundary(&self) -> &Boundary { &self.boundary }

    #[inline] pub fn classifier(&self) -> &TagClassifier { &self.classifier }

    /// Resolve, clip, merge, and partition `features` into a new snapshot.
    /// Features must already be in the boundary's CRS.
    pub fn run(&self, features: Vec<Feature>) -> Result<Snapshot, PipelineError> {
        match &self.pool {
            Some(pool) => pool.install(|| self.run_stages(features)),
            None => self.run_stages(features),
        }
    }

    fn run_stages(&self, mut features: Vec<Feature>) -> Result<Snapshot, PipelineError> {
        let input = features.len();
        let ids = IdAllocator::after(features.iter().map(|feature| &feature.id));

        resolve_all(&mut features, &self.boundary)?;

        let (crossing, resolved): (Vec<Feature>, Vec<Feature>) = features.into_iter()
            .partition(|feature| feature.relation == BoundaryRelation::Crossing);

        let clips: Vec<Clipped> = crossing.into_par_iter()
            .map(|origin| Clipped {
                outcome: clip(&origin.geometry, &self.boundary, self.min_part_area),
                origin,
            })
            .collect();
        debug!("[clip] {} crossing features clipped", clips.len());

        let (table, stats) = merge(resolved, clips, &ids, self.min_part_area)?;
        let authoritative = table.len();
        let (table, views) = partition(table, &self.classifier);

        let report = RunReport::summarize(input, stats, authoritative, &views);
        info!(
            "[pipeline] {} features in, {} out ({} inside, {} clipped, {} outside, {} degenerate)",
            report.input,
            report.authoritative,
            report.inside,
            report.clipped_single + report.clipped_multi,
            report.outside,
            report.dropped_degenerate,
        );

        Ok(Snapshot { table, views, report })
    }
}
