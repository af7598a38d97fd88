//! Tool configuration, loaded from YAML. Every field has a default, so an
//! empty or partial file is valid.

use crate::constants::{AUTO_GROUP_LIMIT, PREVIEW_LEN};
use crate::error::SieveError;
use crate::safety::SafetyPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Batch and render settings
///
/// ```yaml
/// safety:
///   denied_ports: [22, 23, 3389, 3306, 1433, 5432]
///   private_prefixes: ["127.", "10.", "192.168.", "172."]
/// preview_len: 50
/// auto_group_limit: 10
/// drop_identical: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    /// Port denylist and private prefixes
    pub safety: SafetyPolicy,
    /// Characters of a failed line kept in the report
    pub preview_len: usize,
    /// Records placed in the Clash `Auto` group
    pub auto_group_limit: usize,
    /// Drop fully identical records instead of renaming them
    pub drop_identical: bool,
}

impl Default for SieveConfig {
    fn default() -> Self {
        SieveConfig {
            safety: SafetyPolicy::default(),
            preview_len: PREVIEW_LEN,
            auto_group_limit: AUTO_GROUP_LIMIT,
            drop_identical: false,
        }
    }
}

impl SieveConfig {
    /// Parses a YAML document; missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SieveError> {
        if yaml.trim().is_empty() {
            return Ok(SieveConfig::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML config file.
    pub fn load(path: &Path) -> Result<Self, SieveError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| SieveError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }
}
