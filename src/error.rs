use thiserror::Error;

use crate::feature::FeatureId;

/// Failures that abort a pipeline run. Nothing is published when one occurs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A feature geometry is empty, non-finite, or structurally broken.
    #[error("invalid geometry for source record {source_id}: {reason}")]
    InvalidGeometry { source_id: i64, reason: String },

    /// A coordinate could not be transformed into the target CRS.
    #[error("failed to reproject source record {source_id}: {reason}")]
    Reprojection { source_id: i64, reason: String },

    /// A PROJ.4 definition could not be parsed.
    #[error("invalid CRS definition `{definition}`: {reason}")]
    Crs { definition: String, reason: String },

    #[error("boundary set has no polygons")]
    EmptyBoundary,

    /// The boundary set is not a valid multi-polygon.
    #[error("invalid boundary set: {0}")]
    InvalidBoundary(String),

    /// Two features ended up with the same identity.
    #[error("identity collision: {0} assigned more than once")]
    IdentityCollision(FeatureId),

    /// DE-9IM evaluation failed.
    #[error("failed to relate {id} to the boundary: {reason}")]
    Relate { id: FeatureId, reason: String },

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
