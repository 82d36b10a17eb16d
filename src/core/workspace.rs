//! Workspace discovery and structure
//!
//! A workspace is any directory holding a `.costsim/` folder with the
//! configuration and the working scenario.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::ScenarioStore;
use crate::entities::scenario::Scenario;

/// Name of the workspace marker directory
pub const WORKSPACE_DIR: &str = ".costsim";

/// Represents a costsim workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .costsim/)
    root: PathBuf,
}

impl Workspace {
    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path, seeded with `scenario`
    pub fn init(path: &Path, scenario: &Scenario) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(WORKSPACE_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        Self::write_structure(root, scenario)
    }

    /// Force initialization even if .costsim/ exists (config and scenario
    /// are overwritten)
    pub fn init_force(path: &Path, scenario: &Scenario) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_structure(root, scenario)
    }

    fn write_structure(root: PathBuf, scenario: &Scenario) -> Result<Self, WorkspaceError> {
        let workspace = Self { root };

        std::fs::create_dir_all(workspace.costsim_dir())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        std::fs::write(workspace.config_path(), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        ScenarioStore::new(workspace.scenario_path())
            .save(scenario)
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(workspace)
    }

    fn default_config() -> &'static str {
        r#"# costsim workspace configuration

# ERP base URL serving /api/bom and /api/routing
# api_base: "http://localhost:4000"

# Currency symbol shown after amounts
# currency: "€"

# Catalog file (family -> articles -> technical data), relative to this file
# catalog: catalog.yaml

# Timeout for each ERP request, in seconds
# request_timeout_secs: 30

# Default output format (auto, yaml, json, tsv, csv, md)
# default_format: auto
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .costsim directory
    pub fn costsim_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Workspace configuration file
    pub fn config_path(&self) -> PathBuf {
        self.costsim_dir().join("config.yaml")
    }

    /// Working scenario file
    pub fn scenario_path(&self) -> PathBuf {
        self.costsim_dir().join("scenario.json")
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a costsim workspace (searched from {searched_from:?}). Run 'costsim init' to create one, or pass --scenario <FILE>.")]
    NotFound { searched_from: PathBuf },

    #[error("costsim workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path(), &Scenario::sample()).unwrap();

        assert!(ws.costsim_dir().is_dir());
        assert!(ws.config_path().exists());
        assert!(ws.scenario_path().exists());

        let stored = ScenarioStore::new(ws.scenario_path()).load().unwrap();
        assert_eq!(stored.batch_qty, 100.0);
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), &Scenario::default()).unwrap();

        let err = Workspace::init(tmp.path(), &Scenario::default()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
    }

    #[test]
    fn test_workspace_init_force_overwrites_scenario() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), &Scenario::default()).unwrap();
        let ws = Workspace::init_force(tmp.path(), &Scenario::sample()).unwrap();

        let stored = ScenarioStore::new(ws.scenario_path()).load().unwrap();
        assert_eq!(stored.materials.len(), 1);
    }

    #[test]
    fn test_workspace_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), &Scenario::default()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let ws = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }
}
