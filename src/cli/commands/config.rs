//! `costsim config` command - Configuration management
//!
//! View and modify the global and workspace configuration files.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_yml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::core::{Config, Workspace};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,

    /// Show only workspace config
    #[arg(long = "workspace-only")]
    pub workspace_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., api_base, currency)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only workspace config path
    #[arg(long = "workspace-only")]
    pub workspace_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("api_base", "ERP base URL serving /api/bom and /api/routing"),
    ("currency", "Currency symbol shown after amounts"),
    ("catalog", "Catalog YAML file replacing the built-in catalog"),
    ("request_timeout_secs", "Timeout for each ERP request, in seconds"),
    (
        "default_format",
        "Default output format (yaml, json, tsv, csv, md)",
    ),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, _global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path(args) => run_path(args),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load();

    if let Some(key) = &args.key {
        check_key(key)?;
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    if args.workspace_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --workspace-only and --global-only"
        ));
    }

    if args.workspace_only {
        show_config_file("Workspace config:", &get_workspace_config_path()?)?;
    } else if args.global_only {
        show_config_file("Global config:", &get_global_config_path()?)?;
    } else {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();

        for (key, _) in VALID_KEYS {
            print_config_value(key, get_config_value(&config, key), effective_default(&config, key));
        }

        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Environment variables (COSTSIM_API_BASE, COSTSIM_CURRENCY, COSTSIM_CATALOG)");
        println!("  2. Workspace config (.costsim/config.yaml)");
        println!("  3. Global config (~/.config/costsim/config.yaml)");
    }

    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    check_key(&args.key)?;
    let config_path = target_path(args.global)?;

    let mut config_map = read_mapping(&config_path)?;
    config_map.insert(
        Value::String(args.key.clone()),
        typed_value(&args.key, &args.value)?,
    );

    // Refuse to write a file the loader would then ignore
    let candidate = Value::Mapping(config_map.clone());
    serde_yml::from_value::<Config>(candidate)
        .map_err(|e| miette::miette!("Invalid value for '{}': {}", args.key, e))?;

    write_mapping(&config_path, &config_map)?;

    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope(args.global)
    );

    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    check_key(&args.key)?;
    let config_path = target_path(args.global)?;

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_mapping(&config_path)?;
    if config_map.remove(Value::String(args.key.clone())).is_none() {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    write_mapping(&config_path, &config_map)?;

    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope(args.global)
    );

    Ok(())
}

fn run_path(args: PathArgs) -> Result<()> {
    if args.workspace_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --workspace-only and --global-only"
        ));
    }

    if args.workspace_only {
        println!("{}", get_workspace_config_path()?.display());
    } else if args.global_only {
        println!("{}", get_global_config_path()?.display());
    } else {
        let global_path = get_global_config_path()?;

        println!("{}", style("Configuration file paths:").bold());
        println!();
        println!("  {} {}", style("Global:").cyan(), global_path.display());
        println!("          {}", exists_label(&global_path));

        println!();
        match get_workspace_config_path() {
            Ok(path) => {
                println!("  {} {}", style("Workspace:").cyan(), path.display());
                println!("          {}", exists_label(&path));
            }
            Err(_) => println!(
                "  {} {}",
                style("Workspace:").cyan(),
                style("(not in a costsim workspace)").dim()
            ),
        }
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<22} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'costsim config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn get_global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn get_workspace_config_path() -> Result<PathBuf> {
    let workspace = Workspace::discover().map_err(|e| miette::miette!("{}", e))?;
    Ok(workspace.config_path())
}

fn target_path(global: bool) -> Result<PathBuf> {
    if global {
        get_global_config_path()
    } else {
        get_workspace_config_path()
    }
}

fn scope(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "workspace"
    }
}

fn check_key(key: &str) -> Result<()> {
    if VALID_KEYS.iter().any(|(k, _)| *k == key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "Run `costsim config keys` for the list of keys",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

/// YAML value for a key; numeric keys are stored as numbers
fn typed_value(key: &str, value: &str) -> Result<Value> {
    match key {
        "request_timeout_secs" => value
            .trim()
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| miette::miette!("'{}' expects a whole number of seconds", key)),
        _ => Ok(Value::String(value.to_string())),
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "api_base" => config.api_base.clone(),
        "currency" => config.currency.clone(),
        "catalog" => config.catalog.as_ref().map(|p| p.display().to_string()),
        "request_timeout_secs" => config.request_timeout_secs.map(|s| s.to_string()),
        "default_format" => config.default_format.clone(),
        _ => None,
    }
}

/// Value used when a key is not set
fn effective_default(config: &Config, key: &str) -> Option<String> {
    match key {
        "api_base" => Some(config.api_base().to_string()),
        "currency" => Some(config.currency().to_string()),
        "catalog" => Some("built-in".to_string()),
        "default_format" => Some("auto".to_string()),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<String>, default: Option<String>) {
    match (value, default) {
        (Some(v), _) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        (None, Some(d)) => println!(
            "  {}: {} {}",
            style(key).cyan(),
            d,
            style("(default)").dim()
        ),
        (None, None) => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn exists_label(path: &Path) -> console::StyledObject<&'static str> {
    if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    }
}

fn show_config_file(title: &str, path: &Path) -> Result<()> {
    println!("{} {}", style(title).bold(), style(path.display()).dim());
    println!();

    if path.exists() {
        let content = fs::read_to_string(path).into_diagnostic()?;
        print!("{}", content);
    } else {
        println!("{}", style("(not created)").dim());
    }

    Ok(())
}

/// Existing config file as a mapping; missing, empty or null files are empty
fn read_mapping(path: &Path) -> Result<Mapping> {
    if !path.exists() {
        return Ok(Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<Value>(&content).into_diagnostic()? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(miette::miette!(
            "{} is not a YAML mapping",
            path.display()
        )),
    }
}

fn write_mapping(path: &Path, map: &Mapping) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(map).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()?;
    Ok(())
}
