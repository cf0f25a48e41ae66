pub mod feature_registry;
pub mod scaler;
pub mod split;

pub use feature_registry::{complete_feature_vector, extract_feature_vector, FEATURE_NAMES};
pub use scaler::StandardScaler;
pub use split::{stratified_split, SplitIndices};
