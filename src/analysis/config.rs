//! Detector Configuration
//!
//! Rule table + verdict policy, loaded once at startup.
//! Can come from a JSON file or the built-in defaults.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::policy::PolicyConfig;
use super::rules::{
    default_rules, legacy_rules, RuleDefinition, DEFAULT_RULESET_VERSION, LEGACY_RULESET_VERSION,
    MAX_RULE_WEIGHT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read detector config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse detector config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown verdict policy '{0}'")]
    UnknownPolicy(String),

    #[error("unknown detector preset '{0}'")]
    UnknownPreset(String),

    #[error("invalid detector config: {0}")]
    Invalid(String),
}

/// Full detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Version tag of the rule table, recorded in logs and /health
    pub ruleset_version: u32,
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ruleset_version: DEFAULT_RULESET_VERSION,
            rules: default_rules(),
            policy: PolicyConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// First observed configuration: three rules, proportional confidence
    pub fn legacy() -> Self {
        Self {
            ruleset_version: LEGACY_RULESET_VERSION,
            rules: legacy_rules(),
            policy: PolicyConfig::from_id(super::policy::PROPORTIONAL_POLICY_ID)
                .unwrap_or_default(),
        }
    }

    /// Built-in configuration by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::default()),
            "legacy" => Some(Self::legacy()),
            _ => None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Resolve the effective config: file, else preset, else built-in
    /// default; then apply the policy override
    pub fn load(
        path: Option<&Path>,
        preset: Option<&str>,
        policy_override: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = match (path, preset) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(name)) => Self::preset(name)
                .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?,
            (None, None) => Self::default(),
        };

        if let Some(id) = policy_override {
            config.policy = PolicyConfig::from_id(id)
                .ok_or_else(|| ConfigError::UnknownPolicy(id.to_string()))?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        let mut total: u32 = 0;
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err(ConfigError::Invalid("rule id must not be empty".to_string()));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate rule id '{}'", rule.id)));
            }
            if rule.reason.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("rule '{}' has no reason", rule.id)));
            }
            if rule.weight > MAX_RULE_WEIGHT {
                return Err(ConfigError::Invalid(format!(
                    "rule '{}' weight {} exceeds {}",
                    rule.id, rule.weight, MAX_RULE_WEIGHT
                )));
            }
            if rule.enabled {
                total = total.checked_add(rule.weight).ok_or_else(|| {
                    ConfigError::Invalid("sum of rule weights overflows".to_string())
                })?;
            }
        }

        self.policy.validate().map_err(ConfigError::Invalid)
    }
}

// ============================================================================
// TESTS
// ============================================================================
