pub mod feature_builder;
pub mod lookup;

pub use feature_builder::{BuildReport, FeatureBuilder};
pub use lookup::PointInTimeLookup;
