mod bbox;
mod boundary;
mod clip;
mod normalize;
mod proj;

pub(crate) use bbox::BoundingBox;
pub use boundary::Boundary;
pub use clip::{clip, ClipOutcome};
pub use normalize::{area_ha, check_structure, check_validity, clean_parts, normalize_clip, to_multipolygon};
pub use proj::Projector;
