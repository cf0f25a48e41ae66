use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while turning a feature row into a model input.
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("Missing feature '{column}' for {date}")]
    MissingFeature { column: String, date: NaiveDate },
}

/// Errors that abort a training run. No artifact is written when one occurs.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("No labeled FeatureFrame rows found")]
    NoLabeledRows,

    #[error("No complete rows left after dropping {dropped} rows with missing features")]
    NoCompleteRows { dropped: usize },

    #[error("Degenerate class distribution: only label {label} present in {rows} rows")]
    DegenerateClasses { label: u8, rows: usize },

    #[error("Not enough rows for a stratified holdout: label {label} has {count} rows, need at least 2")]
    InsufficientClassRows { label: u8, count: usize },

    #[error("Invalid test fraction {0}: must be in (0, 1)")]
    InvalidTestFraction(f64),

    #[error("Model fit failed: {0}")]
    Fit(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Errors returned by latest-row inference. Missing data is always reported, never defaulted.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("No FeatureFrame rows found. Run the feature build first.")]
    NoFeatureRows,

    #[error("No model artifact named '{name}' found. Train the model first.")]
    NoArtifact { name: String },

    #[error(transparent)]
    MissingFeature(#[from] FeatureError),

    #[error("Model artifact {id} could not be decoded: {reason}")]
    CorruptArtifact { id: i64, reason: String },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl PredictionError {
    /// True when the failure is caused by absent data or model rather than a fault.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            PredictionError::NoFeatureRows
                | PredictionError::NoArtifact { .. }
                | PredictionError::MissingFeature(_)
        )
    }
}
