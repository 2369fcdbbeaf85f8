use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

use crate::feature::{Feature, FeatureId, RawFeature, Tags};
use crate::geom::to_multipolygon;
use crate::table::{FeatureTable, SectorView};

/// Properties with a fixed meaning; everything else may be a tag.
const RESERVED: &[&str] = &["id", "source_id", "osm_id", "name", "tags"];

/// Read loader records from a GeoJSON FeatureCollection.
pub fn read_features(bytes: &[u8]) -> Result<Vec<RawFeature>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("Expected a FeatureCollection with a `features` array"))?;

    features.iter().enumerate()
        .map(|(idx, feature)| {
            parse_feature(idx, feature).with_context(|| format!("Invalid feature at index {idx}"))
        })
        .collect()
}

fn parse_feature(idx: usize, feature: &Value) -> Result<RawFeature> {
    let empty = Map::new();
    let properties = feature["properties"].as_object().unwrap_or(&empty);

    let id = feature.get("id")
        .or_else(|| properties.get("id"))
        .and_then(Value::as_u64)
        .map(FeatureId);

    let source_id = properties.get("source_id")
        .or_else(|| properties.get("osm_id"))
        .and_then(Value::as_i64)
        .unwrap_or(idx as i64);

    let name = properties.get("name").and_then(Value::as_str).map(str::to_string);

    let tags: Tags = match properties.get("tags").and_then(Value::as_object) {
        Some(tags) => tags.iter()
            .map(|(k, v)| (k.clone(), value_to_tag(v)))
            .collect(),
        None => properties.iter()
            .filter(|(k, _)| !RESERVED.contains(&k.as_str()))
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
    };

    let geometry = parse_geometry(&feature["geometry"])?;
    Ok(RawFeature { id, source_id, name, tags, geometry })
}

fn value_to_tag(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read the boundary set: a FeatureCollection of areal features, a single
/// Feature, or a bare geometry. Each areal member becomes one multi-polygon.
pub fn read_boundary(bytes: &[u8]) -> Result<Vec<MultiPolygon<f64>>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;

    let geometries: Vec<&Value> = match value["type"].as_str() {
        Some("FeatureCollection") => value["features"].as_array()
            .ok_or_else(|| anyhow!("FeatureCollection without a `features` array"))?
            .iter()
            .map(|feature| &feature["geometry"])
            .collect(),
        Some("Feature") => vec![&value["geometry"]],
        Some(_) => vec![&value],
        None => bail!("GeoJSON object without a `type`"),
    };

    geometries.into_iter()
        .map(|g| to_multipolygon(parse_geometry(g)?).map_err(|reason| anyhow!("Invalid boundary: {reason}")))
        .collect()
}

/// Parse a GeoJSON geometry object. Only areal geometries (and collections of them) are supported.
pub fn parse_geometry(value: &Value) -> Result<Geometry<f64>> {
    let ty = value["type"].as_str().ok_or_else(|| anyhow!("Geometry without a `type`"))?;
    match ty {
        "Polygon" => {
            let coords = coordinates(value)?;
            Ok(Geometry::Polygon(parse_polygon_coords(coords)?))
        }
        "MultiPolygon" => {
            let polygons = coordinates(value)?.iter()
                .map(|polygon| polygon.as_array()
                    .ok_or_else(|| anyhow!("Invalid MultiPolygon: polygon must be an array"))
                    .and_then(|rings| parse_polygon_coords(rings)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon(polygons)))
        }
        "GeometryCollection" => {
            let members = value["geometries"].as_array()
                .ok_or_else(|| anyhow!("GeometryCollection without `geometries`"))?
                .iter()
                .map(parse_geometry)
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::GeometryCollection(GeometryCollection(members)))
        }
        other => bail!("Unsupported geometry type `{other}`"),
    }
}

fn coordinates(value: &Value) -> Result<&Vec<Value>> {
    value["coordinates"].as_array().ok_or_else(|| anyhow!("Geometry without `coordinates`"))
}

/// Parse polygon coordinates: `[exterior, hole, hole, ...]`.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("Invalid Polygon: ring must be an array"))
            .and_then(|coords| parse_ring_coords(coords))
    });

    let exterior = rings.next().ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from GeoJSON coordinates `[[x, y], [x, y], ...]`.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let points = coords.iter()
        .map(|pair| {
            let pair = pair.as_array().ok_or_else(|| anyhow!("Invalid coordinate: must be an array"))?;
            let x = pair.first().and_then(Value::as_f64)
                .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
            let y = pair.get(1).and_then(Value::as_f64)
                .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
            Ok::<_, anyhow::Error>(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    // Polygon::new closes the ring if needed.
    Ok(LineString(points))
}

/// GeoJSON geometry for a multi-polygon.
pub fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    let ring = |ls: &LineString<f64>| -> Vec<[f64; 2]> { ls.coords().map(|c| [c.x, c.y]).collect() };

    let polygons: Vec<Value> = mp.0.iter()
        .map(|polygon| {
            let mut rings = vec![ring(polygon.exterior())];
            rings.extend(polygon.interiors().iter().map(ring));
            json!(rings)
        })
        .collect();

    json!({ "type": "MultiPolygon", "coordinates": polygons })
}

/// A feature in the output schema.
pub fn feature_to_geojson(feature: &Feature) -> Value {
    json!({
        "type": "Feature",
        "id": feature.id.0,
        "geometry": multipolygon_to_geojson(&feature.geometry),
        "properties": {
            "id": feature.id.0,
            "source_id": feature.source_id,
            "name": feature.name.as_deref(),
            "sector": feature.sector.code(),
            "area_ha": feature.area_ha,
            "tags": &*feature.tags,
        },
    })
}

fn collection<'a>(features: impl Iterator<Item = &'a Feature>) -> Value {
    let features: Vec<Value> = features.map(feature_to_geojson).collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Export the authoritative table as a FeatureCollection.
pub fn table_to_geojson(table: &FeatureTable) -> Value { collection(table.iter()) }

/// Export one sector view as a FeatureCollection.
pub fn view_to_geojson(view: &SectorView) -> Value { collection(view.iter()) }
