//! SQLite implementations of the domain repositories.

mod feature_frame_repository;
mod model_artifact_repository;
mod news_repository;
mod observation_repository;
mod prediction_repository;
mod series_repository;

pub use feature_frame_repository::SqliteFeatureFrameRepository;
pub use model_artifact_repository::SqliteModelArtifactRepository;
pub use news_repository::SqliteNewsRepository;
pub use observation_repository::SqliteObservationRepository;
pub use prediction_repository::SqlitePredictionRepository;
pub use series_repository::SqliteSeriesRepository;
