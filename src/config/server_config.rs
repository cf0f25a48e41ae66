//! HTTP server bind settings.

use super::{parse_var, string_var, EnvLookup};
use anyhow::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerEnvConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let cors_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: string_var(lookup, "SERVER_HOST", "0.0.0.0"),
            port: parse_var(lookup, "PORT", 8000u16)?,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config, ServerEnvConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_server_config_origins() {
        let config = ServerEnvConfig::from_lookup(&|key| match key {
            "CORS_ALLOWED_ORIGINS" => Some("http://a.test, http://b.test,".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.port, 9000);
    }
}
