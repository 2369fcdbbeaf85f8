mod store;
#[allow(clippy::module_inception)]
mod table;
mod view;

pub use store::{FeatureStore, Snapshot};
pub use table::FeatureTable;
pub use view::{SectorView, SectorViews};
