use super::{parse_var, string_var, EnvLookup};
use anyhow::{bail, Result};

/// Direction model training and news NLP batch settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub model_name: String,
    pub test_fraction: f64,
    pub seed: u64,
    /// Articles annotated per NLP run.
    pub annotate_limit: usize,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_name: "spx_direction_logreg".to_string(),
            test_fraction: 0.2,
            seed: 42,
            annotate_limit: 50,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let test_fraction = parse_var(lookup, "MODEL_TEST_FRACTION", defaults.test_fraction)?;
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            bail!(
                "MODEL_TEST_FRACTION must be in (0, 1), got {}",
                test_fraction
            );
        }

        Ok(Self {
            model_name: string_var(lookup, "MODEL_NAME", &defaults.model_name),
            test_fraction,
            seed: parse_var(lookup, "MODEL_SEED", defaults.seed)?,
            annotate_limit: parse_var(lookup, "NEWS_ANNOTATE_LIMIT", defaults.annotate_limit)?,
        })
    }
}
