use std::{collections::HashMap, env, fs, path::PathBuf};

use super::ContainerManifest;
use crate::errors::ConfigError;

/// Environment variable overriding `shared_by_default` from the manifest
pub const SHARED_BY_DEFAULT_ENV: &str = "KEYED_CONTAINER_SHARED_BY_DEFAULT";

/// Loads container manifests from disk and applies environment overrides
pub struct ManifestLoader {
    env_map: Option<HashMap<String, String>>,
}

impl ManifestLoader {
    /// Create a loader reading overrides from the process environment
    pub fn new() -> Self {
        Self { env_map: None }
    }

    /// Create a loader with a fixed set of environment values (for testing)
    pub fn with_env(env_map: HashMap<String, String>) -> Self {
        Self {
            env_map: Some(env_map),
        }
    }

    /// Load a manifest from `path` (`~` is expanded)
    pub fn load(&self, path: &str) -> Result<ContainerManifest, ConfigError> {
        let path = self.expand_path(path);
        let origin = path.to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::FileRead(origin.clone(), e))?;

        let mut manifest = ContainerManifest::from_toml_str(&content, &origin)?;
        self.apply_env_overrides(&mut manifest)?;

        tracing::debug!(
            path = %origin,
            parameters = manifest.parameters.len(),
            aliases = manifest.aliases.len(),
            "Loaded container manifest"
        );
        Ok(manifest)
    }

    fn expand_path(&self, path: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path);
        PathBuf::from(expanded.as_ref())
    }

    /// Collect relevant environment variables
    fn collect_env_vars(&self) -> HashMap<String, String> {
        if let Some(env_map) = &self.env_map {
            return env_map.clone();
        }

        let mut env_map = HashMap::new();
        if let Ok(value) = env::var(SHARED_BY_DEFAULT_ENV) {
            env_map.insert(SHARED_BY_DEFAULT_ENV.to_string(), value);
        }
        env_map
    }

    fn apply_env_overrides(&self, manifest: &mut ContainerManifest) -> Result<(), ConfigError> {
        let env_map = self.collect_env_vars();

        if let Some(raw) = env_map.get(SHARED_BY_DEFAULT_ENV) {
            let flag = parse_flag(raw).ok_or_else(|| {
                ConfigError::InvalidValue(format!("{}={}", SHARED_BY_DEFAULT_ENV, raw))
            })?;
            tracing::debug!(flag, "shared_by_default overridden from environment");
            manifest.shared_by_default = Some(flag);
        }

        Ok(())
    }
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
