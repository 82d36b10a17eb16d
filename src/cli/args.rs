//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    catalog::CatalogArgs,
    completions::CompletionsArgs,
    config::ConfigCommands,
    export::ExportArgs,
    import::ImportArgs,
    init::InitArgs,
    load::LoadArgs,
    mat::MatCommands,
    op::OpCommands,
    set::SetCommands,
    show::ShowArgs,
};

#[derive(Parser)]
#[command(name = "costsim")]
#[command(author, version, about = "Article cost and margin simulator")]
#[command(long_about = "Estimate the manufacturing cost, margin and break-even price of an article \
from its batch size, sale price, materials and routing. Scenarios are plain JSON files that can be \
exported, shared and re-imported.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Scenario file to work on (default: the workspace scenario)
    #[arg(long, global = true, env = "COSTSIM_SCENARIO")]
    pub scenario: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a costsim workspace
    Init(InitArgs),

    /// Show the cost breakdown, margin and break-even price
    Show(ShowArgs),

    /// Set batch, price, discount, overhead or the article selection
    #[command(subcommand)]
    Set(SetCommands),

    /// Material line management
    #[command(subcommand)]
    Mat(MatCommands),

    /// Operation (routing) line management
    #[command(subcommand)]
    Op(OpCommands),

    /// Export the scenario as a JSON document
    Export(ExportArgs),

    /// Merge a previously exported JSON document into the scenario
    Import(ImportArgs),

    /// Load BOM and routing for the article from the ERP
    Load(LoadArgs),

    /// Browse the family / article / technical data catalog
    Catalog(CatalogArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (tables and summaries)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}
