//! `costsim import` command - merge an exported JSON document into the scenario

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::Session;
use crate::cli::helpers::format_money;
use crate::cli::GlobalOpts;
use crate::entities::scenario::ImportSummary;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// JSON document produced by `costsim export`
    pub file: PathBuf,

    /// Parse and report without modifying the scenario
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let source = std::fs::read_to_string(&args.file).into_diagnostic()?;
    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    // A rejected document never reaches the working scenario
    let mut updated = session.scenario.clone();
    let summary = updated.import_json(&source, &filename)?;

    if args.dry_run {
        println!("{} Dry run: {} would be imported", style("○").dim(), filename);
        print_summary(&summary);
        return Ok(());
    }

    session.scenario = updated;
    session.save()?;
    tracing::info!(file = %args.file.display(), "scenario imported");

    if !global.quiet {
        println!(
            "{} Imported {}",
            style("✓").green(),
            style(&filename).cyan()
        );
        print_summary(&summary);
        let results = session.scenario.results();
        println!(
            "  Total cost: {}   Margin: {}",
            style(format_money(results.total_cost, session.currency())).yellow(),
            format_money(results.margin, session.currency())
        );
    }
    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    if let Some(at) = summary.generated_at {
        println!("  Generated:  {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    if summary.fields.is_empty() {
        println!("  Fields:     {}", style("none").dim());
    } else {
        println!("  Fields:     {}", summary.fields.join(", "));
    }
    match summary.materials {
        Some(n) => println!("  Materials:  {} line(s)", n),
        None => println!("  Materials:  {}", style("unchanged").dim()),
    }
    match summary.operations {
        Some(n) => println!("  Operations: {} line(s)", n),
        None => println!("  Operations: {}", style("unchanged").dim()),
    }
}
