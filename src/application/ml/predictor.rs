/// Binary up/down classifier over an ordered feature vector.
pub trait DirectionPredictor: Send + Sync {
    /// Probability that the next close is above today's (0.0 to 1.0).
    fn predict_proba(&self, features: &[f64]) -> Result<f64, String>;

    /// Predicted class: 1 for up, 0 otherwise.
    fn predict_label(&self, features: &[f64]) -> Result<u8, String> {
        Ok(u8::from(self.predict_proba(features)? > 0.5))
    }

    /// Input columns, in the order `features` must follow.
    fn columns(&self) -> &[String];

    fn name(&self) -> &str;
}
