//! `costsim mat` command - Material line management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufReader;

use crate::cli::commands::line_csv::{
    print_template, read_materials, LineImportArgs, MATERIAL_EXAMPLE, MATERIAL_HEADERS,
};
use crate::cli::commands::utils::{to_structured, Session};
use crate::cli::helpers::{format_money, format_qty};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::coerce::{coerce_str, parse_at_least_one};
use crate::core::costing::material_line_cost;
use crate::entities::material::MaterialLine;
use crate::entities::scenario::Scenario;

#[derive(Subcommand, Debug)]
pub enum MatCommands {
    /// List material lines with their batch cost
    List,

    /// Add a material line
    Add(AddArgs),

    /// Update fields of a material line
    Set(SetArgs),

    /// Remove a material line
    Rm(RmArgs),

    /// Append material lines from a CSV file (name,qty,unit_cost)
    Import(LineImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Designation (e.g. "Acier S235")
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Quantity per produced unit
    #[arg(long)]
    pub qty: Option<String>,

    /// Cost of one unit of material
    #[arg(long)]
    pub unit_cost: Option<String>,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Line reference: #N, N, full key or unique key prefix
    pub line: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub qty: Option<String>,

    #[arg(long)]
    pub unit_cost: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Line reference: #N, N, full key or unique key prefix
    pub line: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("key", "KEY", 14),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("qty", "QTY/UNIT", 10),
    ColumnDef::new("unit_cost", "UNIT COST", 12),
    ColumnDef::new("batch_cost", "BATCH COST", 14),
];

pub fn run(cmd: MatCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MatCommands::List => run_list(global),
        MatCommands::Add(args) => run_add(args, global),
        MatCommands::Set(args) => run_set(args, global),
        MatCommands::Rm(args) => run_rm(args, global),
        MatCommands::Import(args) => run_import(args, global),
    }
}

/// Render the material table with per-line batch cost and a subtotal
pub fn render_list(scenario: &Scenario, currency: &str, format: OutputFormat, quiet: bool) -> String {
    let batch = parse_at_least_one(scenario.batch_qty);
    let rows: Vec<TableRow> = scenario
        .materials
        .iter()
        .enumerate()
        .map(|(i, m)| {
            TableRow::new(i + 1)
                .cell("key", CellValue::Key(m.id.to_string()))
                .cell("name", CellValue::Text(m.name.clone()))
                .cell("qty", CellValue::Qty(m.qty))
                .cell("unit_cost", CellValue::Money(m.unit_cost))
                .cell("batch_cost", CellValue::Money(material_line_cost(m, batch)))
        })
        .collect();

    let total = scenario.results().material_total;
    TableFormatter::new(COLUMNS, "material")
        .with_footer(format!(
            "Material total for {} unit(s): {}",
            format_qty(batch),
            format_money(total, currency)
        ))
        .quiet(quiet)
        .render(&rows, format)
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let format = session.format(global);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            print!("{}", to_structured(&session.scenario.materials, format)?);
        }
        _ => print!(
            "{}",
            render_list(&session.scenario, session.currency(), format, global.quiet)
        ),
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let line = if args.interactive {
        let theme = ColorfulTheme::default();
        let name: String = Input::with_theme(&theme)
            .with_prompt("Material")
            .with_initial_text(args.name.unwrap_or_default())
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        let qty: String = Input::with_theme(&theme)
            .with_prompt("Quantity per unit")
            .default(args.qty.unwrap_or_else(|| "1".to_string()))
            .interact_text()
            .into_diagnostic()?;
        let unit_cost: String = Input::with_theme(&theme)
            .with_prompt("Unit cost")
            .default(args.unit_cost.unwrap_or_else(|| "0".to_string()))
            .interact_text()
            .into_diagnostic()?;
        MaterialLine::new(name, coerce_str(&qty), coerce_str(&unit_cost))
    } else {
        let mut line = MaterialLine::blank();
        if let Some(name) = args.name {
            line.name = name;
        }
        if let Some(qty) = args.qty {
            line.qty = coerce_str(&qty);
        }
        if let Some(cost) = args.unit_cost {
            line.unit_cost = coerce_str(&cost);
        }
        line
    };

    let position = session.scenario.materials.len() + 1;
    let key = session.scenario.add_material(line).id.to_string();
    session.save()?;

    if !global.quiet {
        println!(
            "{} Added material #{} {}",
            style("✓").green(),
            position,
            style(&key).cyan()
        );
        print_material_total(&session);
    }
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    if args.name.is_none() && args.qty.is_none() && args.unit_cost.is_none() {
        return Err(miette::miette!(
            "Nothing to update (use --name, --qty or --unit-cost)"
        ));
    }

    let mut session = Session::open(global)?;
    let line = session
        .scenario
        .material_mut(&args.line)
        .map_err(|e| miette::miette!("{}", e))?;

    if let Some(name) = args.name {
        line.name = name;
    }
    if let Some(qty) = args.qty {
        line.qty = coerce_str(&qty);
    }
    if let Some(cost) = args.unit_cost {
        line.unit_cost = coerce_str(&cost);
    }
    let key = line.id.to_string();
    session.save()?;

    if !global.quiet {
        println!("{} Updated material {}", style("✓").green(), style(&key).cyan());
        print_material_total(&session);
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let removed = session
        .scenario
        .remove_material(&args.line)
        .map_err(|e| miette::miette!("{}", e))?;
    session.save()?;

    if !global.quiet {
        println!(
            "{} Removed material {} {}",
            style("✓").green(),
            style(removed.id.to_string()).cyan(),
            removed.name
        );
        print_material_total(&session);
    }
    Ok(())
}

fn run_import(args: LineImportArgs, global: &GlobalOpts) -> Result<()> {
    let Some(path) = args.file.as_ref().filter(|_| !args.template) else {
        print_template(MATERIAL_HEADERS, MATERIAL_EXAMPLE, "mat");
        return Ok(());
    };

    let mut session = Session::open(global)?;
    let file = File::open(path).into_diagnostic()?;
    let (lines, stats) = read_materials(BufReader::new(file), args.skip_errors)?;

    if args.dry_run {
        println!(
            "{} {} material line(s) would be {} ({} row(s), {} error(s))",
            style("○").dim(),
            stats.lines_created,
            if args.replace { "loaded" } else { "appended" },
            stats.rows_processed,
            stats.errors
        );
        return Ok(());
    }

    if args.replace {
        session.scenario.materials.clear();
    }
    session.scenario.materials.extend(lines);
    session.save()?;
    tracing::info!(created = stats.lines_created, "materials imported");

    if !global.quiet {
        println!(
            "{} Imported {} material line(s) from {}",
            style("✓").green(),
            style(stats.lines_created).cyan(),
            path.display()
        );
        if stats.errors > 0 {
            println!("  {} row(s) skipped", style(stats.errors).yellow());
        }
        print_material_total(&session);
    }
    Ok(())
}

fn print_material_total(session: &Session) {
    let results = session.scenario.results();
    println!(
        "  Material total: {}",
        style(format_money(results.material_total, session.currency())).yellow()
    );
}
