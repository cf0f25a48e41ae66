use super::{string_var, EnvLookup};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/marketpulse.db";

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseEnvConfig {
    pub url: String,
}

impl Default for DatabaseEnvConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl DatabaseEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Self {
        Self {
            url: string_var(lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
        }
    }
}
