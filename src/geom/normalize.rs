use geo::{Area, Geometry, LineString, MultiPolygon, Polygon, Validation};

use crate::geom::ClipOutcome;

const M2_PER_HECTARE: f64 = 10_000.0;

/// Area in hectares of a geometry expressed in an equal-area CRS with meter units.
#[inline]
pub fn area_ha(geometry: &MultiPolygon<f64>) -> f64 {
    geometry.unsigned_area() / M2_PER_HECTARE
}

/// Coerce a loader geometry into a multi-polygon.
/// Bare polygons are wrapped; non-areal geometries are rejected.
pub fn to_multipolygon(geometry: Geometry<f64>) -> Result<MultiPolygon<f64>, String> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon(vec![polygon])),
        Geometry::MultiPolygon(mp) => Ok(mp),
        Geometry::Rect(rect) => Ok(MultiPolygon(vec![rect.to_polygon()])),
        Geometry::Triangle(triangle) => Ok(MultiPolygon(vec![triangle.to_polygon()])),
        Geometry::GeometryCollection(collection) => {
            let mut polygons = Vec::new();
            for member in collection.0 {
                polygons.extend(to_multipolygon(member)?.0);
            }
            Ok(MultiPolygon(polygons))
        }
        other => Err(format!("expected an areal geometry, found {}", geometry_type(&other))),
    }
}

fn geometry_type(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Structural checks the pipeline relies on: finite coordinates and
/// closed rings of at least four coordinates.
pub fn check_structure(geometry: &MultiPolygon<f64>) -> Result<(), String> {
    fn check_ring(ring: &LineString<f64>, what: &str) -> Result<(), String> {
        if ring.0.len() < 4 {
            return Err(format!("{what} ring has {} coordinates, need at least 4", ring.0.len()));
        }
        if !ring.is_closed() {
            return Err(format!("{what} ring is not closed"));
        }
        if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(format!("{what} ring has non-finite coordinates"));
        }
        Ok(())
    }

    if geometry.0.is_empty() {
        return Err("geometry has no polygons".to_string());
    }
    for polygon in &geometry.0 {
        check_ring(polygon.exterior(), "exterior")?;
        for hole in polygon.interiors() {
            check_ring(hole, "interior")?;
        }
    }
    Ok(())
}

/// Topological validity: no self-intersecting rings, holes inside their
/// exterior, parts that do not overlap each other.
pub fn check_validity(geometry: &MultiPolygon<f64>) -> Result<(), String> {
    let errors = geometry.validation_errors();
    if errors.is_empty() { return Ok(()) }

    Err(errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
}

/// Drop parts with area `<= min_part_area` and exact duplicate parts, keeping first occurrences.
pub fn clean_parts(geometry: MultiPolygon<f64>, min_part_area: f64) -> MultiPolygon<f64> {
    let mut parts: Vec<Polygon<f64>> = Vec::with_capacity(geometry.0.len());
    for part in geometry.0 {
        if part.unsigned_area() <= min_part_area { continue }
        if parts.contains(&part) { continue }
        parts.push(part);
    }
    MultiPolygon(parts)
}

/// Canonical multi-polygon for a clip result, or `None` if nothing remains.
pub fn normalize_clip(outcome: ClipOutcome, min_part_area: f64) -> Option<MultiPolygon<f64>> {
    let geometry = match outcome {
        ClipOutcome::SinglePart(polygon) => MultiPolygon(vec![polygon]),
        ClipOutcome::MultiPart(mp) => mp,
        ClipOutcome::Empty => return None,
    };

    let cleaned = clean_parts(geometry, min_part_area);
    (!cleaned.0.is_empty()).then_some(cleaned)
}
