use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::retry::RetryPolicy;

/// Road data source settings, loadable from TOML.
///
/// ```toml
/// endpoints = ["https://overpass-api.de/api/interpreter"]
/// max_attempts = 2
/// backoff_ms = 1500
/// timeout_ms = 25000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Tried in order until one answers
    pub endpoints: Vec<String>,
    /// Attempts per endpoint
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub timeout_ms: u64,
    /// `highway=*` values treated as kerbside streets
    pub highway_classes: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                "https://overpass-api.de/api/interpreter".to_string(),
                "https://overpass.kumi.systems/api/interpreter".to_string(),
                "https://overpass.private.coffee/api/interpreter".to_string(),
            ],
            max_attempts: 2,
            backoff_ms: 1500,
            timeout_ms: 25_000,
            highway_classes: [
                "trunk",
                "primary",
                "secondary",
                "tertiary",
                "unclassified",
                "residential",
                "living_street",
                "service",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            user_agent: concat!("curbside/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, FetchError> {
        let config: Self = toml::from_str(text).map_err(|e| FetchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        if self.max_attempts == 0 {
            return Err(FetchError::Config("max_attempts must be at least 1".into()));
        }
        if self.timeout_ms == 0 {
            return Err(FetchError::Config("timeout_ms must be positive".into()));
        }
        if self.highway_classes.is_empty() {
            return Err(FetchError::Config("highway_classes is empty".into()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.backoff_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}
