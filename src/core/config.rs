//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Workspace;

/// Default ERP endpoint when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:4000";

/// Default currency symbol for amounts
pub const DEFAULT_CURRENCY: &str = "€";

/// costsim configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the ERP API serving /api/bom and /api/routing
    pub api_base: Option<String>,

    /// Currency symbol shown after amounts
    pub currency: Option<String>,

    /// Catalog YAML file replacing the built-in catalog
    pub catalog: Option<PathBuf>,

    /// Timeout for each ERP request, in seconds
    pub request_timeout_secs: Option<u64>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let workspace = Workspace::discover().ok();
        Self::load_layers(
            Self::global_config_path().as_deref(),
            workspace.as_ref().map(|w| w.config_path()).as_deref(),
        )
    }

    /// Merge built-in defaults, the given config files and the environment
    pub fn load_layers(global: Option<&Path>, workspace: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/costsim/config.yaml)
        if let Some(layer) = global.and_then(Self::read_layer) {
            config.merge(layer);
        }

        // 3. Workspace config (.costsim/config.yaml)
        if let Some(layer) = workspace.and_then(Self::read_layer) {
            config.merge(layer);
        }

        // 4. Environment variables
        if let Ok(api_base) = std::env::var("COSTSIM_API_BASE") {
            config.api_base = Some(api_base);
        }
        if let Ok(currency) = std::env::var("COSTSIM_CURRENCY") {
            config.currency = Some(currency);
        }
        if let Ok(catalog) = std::env::var("COSTSIM_CATALOG") {
            config.catalog = Some(PathBuf::from(catalog));
        }

        config
    }

    /// Read one config file; unreadable or invalid files are skipped
    fn read_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(mut layer) => {
                // Relative catalog paths are relative to the file declaring them
                if let (Some(catalog), Some(dir)) = (layer.catalog.as_mut(), path.parent()) {
                    if catalog.is_relative() {
                        *catalog = dir.join(&*catalog);
                    }
                }
                Some(layer)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "costsim")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
        if other.currency.is_some() {
            self.currency = other.currency;
        }
        if other.catalog.is_some() {
            self.catalog = other.catalog;
        }
        if other.request_timeout_secs.is_some() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// ERP base URL
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// Currency symbol
    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .map(std::time::Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base(), DEFAULT_API_BASE);
        assert_eq!(config.currency(), "€");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = Config {
            api_base: Some("http://erp-a:4000".to_string()),
            currency: Some("$".to_string()),
            ..Config::default()
        };
        base.merge(Config {
            api_base: Some("http://erp-b:4000".to_string()),
            request_timeout_secs: Some(5),
            ..Config::default()
        });

        assert_eq!(base.api_base(), "http://erp-b:4000");
        assert_eq!(base.currency(), "$");
        assert_eq!(base.request_timeout(), Some(std::time::Duration::from_secs(5)));
    }

    #[test]
    fn test_read_layer_resolves_relative_catalog() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "currency: CHF\ncatalog: catalog.yaml\n").unwrap();

        let layer = Config::read_layer(&path).unwrap();
        assert_eq!(layer.currency.as_deref(), Some("CHF"));
        assert_eq!(layer.catalog, Some(tmp.path().join("catalog.yaml")));
    }

    #[test]
    fn test_read_layer_skips_invalid_and_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "currency: [unterminated\n").unwrap();
        assert!(Config::read_layer(&path).is_none());
        assert!(Config::read_layer(&tmp.path().join("nope.yaml")).is_none());
    }

    #[test]
    fn test_blank_api_base_falls_back() {
        let config = Config {
            api_base: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.api_base(), DEFAULT_API_BASE);
    }
}
