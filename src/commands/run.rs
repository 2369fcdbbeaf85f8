use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use crate::cli::RunArgs;
use crate::common::{ensure_dir_exists, read_file, write_json_file};
use crate::config::PipelineConfig;
use crate::geom::{Boundary, Projector};
use crate::ingest::Ingestor;
use crate::io::geojson::{read_boundary, read_features, table_to_geojson, view_to_geojson};
use crate::pipeline::Pipeline;
use crate::table::FeatureStore;

/// Source id reported when a boundary geometry fails to reproject.
const BOUNDARY_SOURCE_ID: i64 = -1;

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(source_crs) = &args.source_crs { config.source_crs = Some(source_crs.clone()); }
    if let Some(threads) = args.threads { config.threads = Some(threads); }

    info!(
        "[run] features={} boundary={} -> {}",
        args.features.display(),
        args.boundary.display(),
        args.out.display()
    );

    let projector = Projector::new(config.source_crs.as_deref(), &config.target_crs)?;
    let pieces = read_boundary(&read_file(&args.boundary)?)
        .with_context(|| format!("Failed to load boundary {}", args.boundary.display()))?
        .into_iter()
        .map(|piece| projector.project(BOUNDARY_SOURCE_ID, piece))
        .collect::<Result<Vec<_>, _>>()?;
    let boundary = Boundary::dissolve(pieces)?;

    let records = read_features(&read_file(&args.features)?)
        .with_context(|| format!("Failed to load features {}", args.features.display()))?;
    let (features, ingest) = Ingestor::from_config(&config)?.ingest(records)?;

    let pipeline = Pipeline::from_config(&config, boundary)?;
    let store = FeatureStore::new();
    let snapshot = store.rebuild(&pipeline, features)?;

    let out_dir = &args.out;
    ensure_dir_exists(out_dir)?;

    write_json_file(&out_dir.join("authoritative.geojson"), &table_to_geojson(&snapshot.table), args.force)?;
    for view in snapshot.views.iter() {
        let path = out_dir.join(format!("{}.geojson", view.sector()));
        write_json_file(&path, &view_to_geojson(view), args.force)?;
    }
    write_json_file(
        &out_dir.join("report.json"),
        &json!({ "ingest": ingest, "run": snapshot.report }),
        args.force,
    )?;

    println!(
        "Wrote {} features ({} unclassified) into {}",
        snapshot.report.authoritative,
        snapshot.report.unclassified,
        out_dir.display()
    );
    Ok(())
}
