//! Shared utilities for CLI commands

use clap::ValueEnum;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Catalog, Config, ScenarioStore, Workspace};
use crate::entities::scenario::Scenario;

/// The scenario a command works on, with the configuration in effect
pub struct Session {
    pub config: Config,
    pub store: ScenarioStore,
    pub scenario: Scenario,
}

impl Session {
    /// Open the scenario named by `--scenario`, or the workspace scenario
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let store = ScenarioStore::new(scenario_path(global)?);
        let scenario = store.load()?;
        Ok(Self {
            config,
            store,
            scenario,
        })
    }

    /// Persist the scenario back to where it was read from
    pub fn save(&self) -> Result<()> {
        self.store.save(&self.scenario)?;
        Ok(())
    }

    pub fn currency(&self) -> &str {
        self.config.currency()
    }

    /// Output format, with `auto` resolved through the configured default
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        effective_format(global, &self.config)
    }

    /// Catalog named in the config, or the built-in one
    pub fn catalog(&self) -> Result<Catalog> {
        load_catalog(&self.config)
    }
}

/// Path of the scenario file to operate on
pub fn scenario_path(global: &GlobalOpts) -> Result<PathBuf> {
    match &global.scenario {
        Some(path) => Ok(path.clone()),
        None => {
            let workspace = Workspace::discover().map_err(|e| miette::miette!("{}", e))?;
            Ok(workspace.scenario_path())
        }
    }
}

/// Explicit `--format` wins; otherwise the configured `default_format`
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| OutputFormat::from_str(f, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

pub fn load_catalog(config: &Config) -> Result<Catalog> {
    Catalog::load_or_builtin(config.catalog.as_deref()).map_err(|e| miette::miette!("{}", e))
}

/// Write to a file, or to stdout when no path is given
pub fn write_output(content: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Serialize a value as pretty JSON or YAML
pub fn to_structured<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(value).into_diagnostic(),
        _ => {
            let mut json = serde_json::to_string_pretty(value).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            format,
            quiet: false,
            verbose: false,
            scenario: None,
        }
    }

    #[test]
    fn test_effective_format() {
        let config = Config {
            default_format: Some("csv".to_string()),
            ..Config::default()
        };
        assert_eq!(effective_format(&global(OutputFormat::Auto), &config), OutputFormat::Csv);
        assert_eq!(effective_format(&global(OutputFormat::Json), &config), OutputFormat::Json);

        let bogus = Config {
            default_format: Some("xml".to_string()),
            ..Config::default()
        };
        assert_eq!(effective_format(&global(OutputFormat::Auto), &bogus), OutputFormat::Auto);
    }

    #[test]
    fn test_explicit_scenario_path() {
        let mut opts = global(OutputFormat::Auto);
        opts.scenario = Some(PathBuf::from("/tmp/elsewhere.json"));
        assert_eq!(scenario_path(&opts).unwrap(), PathBuf::from("/tmp/elsewhere.json"));
    }

    #[test]
    fn test_write_output_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        write_output("hello\n", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
