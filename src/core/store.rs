//! Scenario file persistence
//!
//! The working scenario is stored in the same JSON shape as an export, so a
//! workspace scenario file can be handed to anyone as-is.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::scenario::{Scenario, ScenarioError};

/// A scenario file on disk
#[derive(Debug, Clone)]
pub struct ScenarioStore {
    path: PathBuf,
}

impl ScenarioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the scenario file
    pub fn load(&self) -> Result<Scenario, StoreError> {
        tracing::debug!(path = %self.path.display(), "loading scenario");
        let source = std::fs::read_to_string(&self.path).map_err(|e| StoreError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        let scenario = Scenario::from_json(&source, &self.path.display().to_string())?;
        tracing::debug!(
            materials = scenario.materials.len(),
            operations = scenario.operations.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    /// Write the scenario, replacing the file only once fully written
    pub fn save(&self, scenario: &Scenario) -> Result<(), StoreError> {
        let json = scenario.export_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: e,
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json + "\n")
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %self.path.display(), "scenario saved");
        Ok(())
    }
}

/// Errors reading or writing scenario files
#[derive(Debug, Error, miette::Diagnostic)]
pub enum StoreError {
    #[error("cannot read scenario {path}: {source}")]
    #[diagnostic(code(costsim::store::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write scenario {path}: {source}")]
    #[diagnostic(code(costsim::store::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scenario(#[from] ScenarioError),
}
