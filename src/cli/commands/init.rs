//! `costsim init` command - Initialize a new workspace

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::workspace::{Workspace, WorkspaceError};
use crate::entities::scenario::Scenario;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Start from an empty scenario instead of the sample one
    #[arg(long)]
    pub empty: bool,

    /// Force initialization even if .costsim/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let scenario = if args.empty {
        Scenario::default()
    } else {
        Scenario::sample()
    };

    let workspace = if args.force {
        Workspace::init_force(&path, &scenario)
    } else {
        Workspace::init(&path, &scenario)
    };

    match workspace {
        Ok(workspace) => {
            println!(
                "{} Initialized costsim workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            println!();
            println!("Created:");
            print_structure(workspace.root());
            println!();
            println!("Next steps:");
            println!(
                "  {} Show the cost breakdown",
                style("costsim show").yellow()
            );
            println!(
                "  {} Pick the article to cost",
                style("costsim set article <REF>").yellow()
            );
            println!(
                "  {} Load its BOM and routing from the ERP",
                style("costsim load").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} costsim workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("costsim init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    for entry in [".costsim/", ".costsim/config.yaml", ".costsim/scenario.json"] {
        let exists = root.join(entry).exists();
        let marker = if exists {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {}", marker, entry);
    }
}
