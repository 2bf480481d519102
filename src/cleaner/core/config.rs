//! Configuration for the cleaner.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cleaner::core::errors::{CleanerError, CleanerResult};
use crate::cleaner::core::ids::BackendId;
use crate::cleaner::core::strategy::{StrategyOptions, StrategySpec};

/// Environment variable naming the backend to use instead of detection.
pub const ENV_BACKEND: &str = "CLEANSLATE_BACKEND";
/// Environment variable holding the default strategy (`name` or JSON).
pub const ENV_STRATEGY: &str = "CLEANSLATE_STRATEGY";

/// Top-level configuration applied to a dispatcher.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Explicit backend; `None` leaves resolution to detection.
    pub backend: Option<String>,
    /// Default strategy: `"name"` or `["name", {options}]`.
    pub strategy: Option<Value>,
    /// Extra connection names per backend.
    pub connections: HashMap<String, Vec<String>>,
}

impl CleanerConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_json_str(raw: &str) -> CleanerResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from the process environment.
    ///
    /// `CLEANSLATE_STRATEGY` may hold a bare name (`truncation`) or a JSON
    /// request (`["truncation", {"pre_count": true}]`).
    ///
    /// # Errors
    /// Returns an error if the values fail validation.
    pub fn from_env() -> CleanerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CleanerResult<Self> {
        let backend = lookup(ENV_BACKEND).filter(|v| !v.trim().is_empty());
        let strategy = lookup(ENV_STRATEGY)
            .filter(|v| !v.trim().is_empty())
            .map(|raw| {
                let trimmed = raw.trim();
                if trimmed.starts_with('[') || trimmed.starts_with('"') {
                    serde_json::from_str(trimmed)
                } else {
                    Ok(Value::String(trimmed.to_string()))
                }
            })
            .transpose()?;

        let config = Self {
            backend,
            strategy,
            connections: HashMap::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any value cannot be turned into its typed form.
    pub fn validate(&self) -> CleanerResult<()> {
        if let Some(backend) = &self.backend {
            BackendId::new(backend)?;
        }

        if let Some(strategy) = &self.strategy {
            StrategySpec::from_json(strategy.clone())?;
        }

        for (backend, names) in &self.connections {
            BackendId::new(backend)?;
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(CleanerError::InvalidConfig(format!(
                    "connections for {backend} must not contain empty names"
                )));
            }
        }

        Ok(())
    }

    /// Typed backend, if one is configured.
    ///
    /// # Errors
    /// Returns an error if the configured value is not a valid token.
    pub fn backend_id(&self) -> CleanerResult<Option<BackendId>> {
        self.backend.as_deref().map(BackendId::new).transpose()
    }

    /// Typed default strategy, if one is configured.
    ///
    /// # Errors
    /// Returns an error if the configured value has an invalid shape.
    pub fn strategy_spec(&self) -> CleanerResult<Option<(StrategySpec, Option<StrategyOptions>)>> {
        self.strategy.clone().map(StrategySpec::from_json).transpose()
    }
}
