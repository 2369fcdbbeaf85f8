//! File formats the pipeline reads and writes.
//!
//! - `geojson` - loader records and boundary sets in, feature tables and sector views out

pub mod geojson;
