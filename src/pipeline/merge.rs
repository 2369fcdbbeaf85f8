use serde::Serialize;
use tracing::debug;

use crate::error::PipelineError;
use crate::feature::{BoundaryRelation, Feature};
use crate::geom::{area_ha, normalize_clip, ClipOutcome};
use crate::pipeline::IdAllocator;
use crate::table::FeatureTable;

/// A crossing feature together with its intersection with the boundary set.
#[derive(Debug, Clone)]
pub struct Clipped {
    pub origin: Feature,
    pub outcome: ClipOutcome,
}

/// Counters of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub kept_inside: usize,
    pub removed_outside: usize,
    pub removed_crossing: usize,
    pub clipped_single: usize,
    pub clipped_multi: usize,
    pub dropped_degenerate: usize,
}

/// Build the authoritative table from resolved features and clip results.
///
/// The new table holds exactly the `inside` features plus one descendant per
/// crossing feature with a non-degenerate intersection. Descendants get fresh
/// ids from `ids`: single-part results first, then multi-part results, each
/// group in ascending order of the originating id. Nothing is modified in
/// place, so a failure leaves no partial table behind.
pub fn merge(
    resolved: Vec<Feature>,
    clips: Vec<Clipped>,
    ids: &IdAllocator,
    min_part_area: f64,
) -> Result<(FeatureTable, MergeStats), PipelineError> {
    let mut stats = MergeStats::default();

    let mut rows: Vec<Feature> = Vec::with_capacity(resolved.len() + clips.len());
    for feature in resolved {
        match feature.relation {
            BoundaryRelation::Inside => {
                stats.kept_inside += 1;
                rows.push(feature);
            }
            BoundaryRelation::Outside => stats.removed_outside += 1,
            // Pre-clip geometry of a crossing feature is never kept.
            BoundaryRelation::Crossing => stats.removed_crossing += 1,
        }
    }

    let mut single = Vec::new();
    let mut multi = Vec::new();
    for clipped in clips {
        stats.removed_crossing += 1;
        match clipped.outcome {
            ClipOutcome::SinglePart(_) => single.push(clipped),
            ClipOutcome::MultiPart(_) => multi.push(clipped),
            ClipOutcome::Empty => {
                debug!("[merge] {} clips to nothing, dropped", clipped.origin.id);
                stats.dropped_degenerate += 1;
            }
        }
    }
    single.sort_by_key(|clipped| clipped.origin.id);
    multi.sort_by_key(|clipped| clipped.origin.id);

    for (group, count) in [(single, &mut stats.clipped_single), (multi, &mut stats.clipped_multi)] {
        for Clipped { origin, outcome } in group {
            let Some(geometry) = normalize_clip(outcome, min_part_area) else {
                debug!("[merge] {} normalizes to nothing, dropped", origin.id);
                stats.dropped_degenerate += 1;
                continue;
            };
            let area = area_ha(&geometry);
            rows.push(origin.descendant(ids.allocate(), geometry, area));
            *count += 1;
        }
    }

    debug!(
        "[merge] kept {} inside, inserted {} single-part and {} multi-part clips",
        stats.kept_inside, stats.clipped_single, stats.clipped_multi,
    );

    let table = FeatureTable::build(rows)?;
    Ok((table, stats))
}
