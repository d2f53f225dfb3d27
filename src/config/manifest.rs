use super::ContainerConfig;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declarative part of a container configuration, as stored in TOML.
///
/// ```toml
/// shared_by_default = true
///
/// [parameters]
/// "db.url" = "postgres://localhost/app"
///
/// [aliases]
/// database = "db.url"
///
/// [shared]
/// "db.url" = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerManifest {
    pub shared_by_default: Option<bool>,
    pub parameters: HashMap<String, toml::Value>,
    pub aliases: HashMap<String, String>,
    pub shared: HashMap<String, bool>,
}

impl ContainerManifest {
    /// Parse a manifest; `origin` only names the source in errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParse(origin.to_string(), e))
    }

    /// Convert into a batch. Parameters become `toml::Value` service instances.
    pub fn into_config(self) -> ContainerConfig {
        let mut config = ContainerConfig::new();
        for (key, value) in self.parameters {
            config = config.service(key, value);
        }
        for (alias, target) in self.aliases {
            config = config.alias(alias, target);
        }
        for (key, flag) in self.shared {
            config = config.shared(key, flag);
        }
        if let Some(flag) = self.shared_by_default {
            config = config.shared_by_default(flag);
        }
        config
    }
}
