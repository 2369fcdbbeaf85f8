use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::error::PipelineError;

/// Returns true for geographic (degree-based) PROJ.4 definitions.
#[inline]
fn is_geographic(definition: &str) -> bool {
    definition.contains("+proj=longlat") || definition.contains("+proj=latlong")
}

fn build(definition: &str) -> Result<Proj4, PipelineError> {
    Proj4::from_proj_string(definition).map_err(|e| PipelineError::Crs {
        definition: definition.to_string(),
        reason: e.to_string(),
    })
}

/// Reprojects loader geometries into the fixed target CRS.
/// An identity projector is used when inputs are already in the target CRS.
pub struct Projector {
    inner: Option<Transform>,
}

struct Transform {
    from: Proj4,
    to: Proj4,
    from_geographic: bool,
    to_geographic: bool,
}

impl Projector {
    /// Projector from `source` (or identity if `None`) into `target`.
    pub fn new(source: Option<&str>, target: &str) -> Result<Self, PipelineError> {
        let to = build(target)?;
        let inner = match source {
            Some(source) if source.trim() != target.trim() => Some(Transform {
                from: build(source)?,
                to,
                from_geographic: is_geographic(source),
                to_geographic: is_geographic(target),
            }),
            _ => None,
        };
        Ok(Self { inner })
    }

    /// Projector that leaves coordinates unchanged.
    pub fn identity() -> Self { Self { inner: None } }

    #[inline] pub fn is_identity(&self) -> bool { self.inner.is_none() }

    /// Transform a single coordinate. Geographic coordinates are in degrees.
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, String> {
        let Some(t) = &self.inner else { return Ok(coord) };

        // proj4rs works in radians for geographic CRSs.
        let mut point = if t.from_geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&t.from, &t.to, &mut point).map_err(|e| e.to_string())?;

        let (x, y) = if t.to_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        if !x.is_finite() || !y.is_finite() {
            return Err(format!("coordinate ({}, {}) projects to a non-finite value", coord.x, coord.y));
        }
        Ok(Coord { x, y })
    }

    /// Transform every coordinate of a multi-polygon.
    pub fn project(&self, source_id: i64, geometry: MultiPolygon<f64>) -> Result<MultiPolygon<f64>, PipelineError> {
        if self.is_identity() { return Ok(geometry) }

        geometry.try_map_coords(|coord: Coord<f64>| self.project_coord(coord))
            .map_err(|reason| PipelineError::Reprojection { source_id, reason })
    }
}
