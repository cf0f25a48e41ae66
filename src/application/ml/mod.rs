pub mod prediction_service;
pub mod predictor;
pub mod smartcore_predictor;
pub mod trainer;

pub use prediction_service::{DirectionPrediction, PredictionService};
pub use predictor::DirectionPredictor;
pub use smartcore_predictor::SmartcoreDirectionModel;
pub use trainer::{DirectionTrainer, TrainingReport, TrainingSettings};
