#![doc = "Boundary clipping and land-use sector partitioning of polygon feature tables"]
mod classify;
mod common;
mod config;
mod error;
mod feature;
mod geom;
mod ingest;
mod table;

pub mod cli;
pub mod commands;
pub mod io;
pub mod pipeline;

#[doc(inline)]
pub use classify::{ClassifierRule, TagClassifier};

#[doc(inline)]
pub use config::{PipelineConfig, ETRS89_LAEA_PROJ4, WGS84_PROJ4};

#[doc(inline)]
pub use error::PipelineError;

#[doc(inline)]
pub use feature::{BoundaryRelation, Feature, FeatureId, RawFeature, Sector, Tags};

#[doc(inline)]
pub use geom::{area_ha, clip, Boundary, ClipOutcome, Projector};

#[doc(inline)]
pub use ingest::{IngestStats, Ingestor};

#[doc(inline)]
pub use pipeline::{Pipeline, RunReport, SectorSummary};

#[doc(inline)]
pub use table::{FeatureStore, FeatureTable, SectorView, SectorViews, Snapshot};
