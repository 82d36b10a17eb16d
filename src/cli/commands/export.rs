//! `costsim export` command - write the scenario as a JSON document

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{write_output, Session};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output file (default: simu_<article>.json in the current directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print the document to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let json = session.scenario.export_json()?;

    if args.stdout {
        println!("{}", json);
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(session.scenario.export_file_name()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    write_output(&format!("{}\n", json), Some(&path))?;
    tracing::info!(path = %path.display(), "scenario exported");

    if !global.quiet {
        println!(
            "{} Exported scenario to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}
