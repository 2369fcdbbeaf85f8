use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::classify::TagClassifier;
use crate::table::{FeatureTable, SectorViews};

/// Re-derive every feature's sector from its tags, freeze the table, and
/// slice it into the four sector views.
pub fn partition(mut table: FeatureTable, classifier: &TagClassifier) -> (Arc<FeatureTable>, SectorViews) {
    table.features_mut().par_iter_mut().for_each(|feature| {
        feature.sector = classifier.classify(&feature.tags);
    });

    let table = Arc::new(table);
    let views = SectorViews::build(&table);

    for view in views.iter() {
        debug!("[partition] {}: {} features, {:.2} ha", view.sector(), view.len(), view.area_ha());
    }
    (table, views)
}
