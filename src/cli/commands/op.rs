//! `costsim op` command - Operation (routing) line management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::BufReader;

use crate::cli::commands::line_csv::{
    print_template, read_operations, LineImportArgs, OPERATION_EXAMPLE, OPERATION_HEADERS,
};
use crate::cli::commands::utils::{to_structured, Session};
use crate::cli::helpers::{format_money, format_qty};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::coerce::{coerce_str, parse_at_least_one};
use crate::core::costing::operation_line_cost;
use crate::entities::operation::{OperationLine, OperationType};
use crate::entities::scenario::Scenario;

#[derive(Subcommand, Debug)]
pub enum OpCommands {
    /// List operation lines with their batch cost
    List,

    /// Add an operation line
    Add(AddArgs),

    /// Update fields of an operation line
    Set(SetArgs),

    /// Remove an operation line
    Rm(RmArgs),

    /// Append operation lines from a CSV file
    Import(LineImportArgs),
}

/// Editable operation fields, shared by `add` and `set`
#[derive(clap::Args, Debug, Default)]
pub struct OpFields {
    /// Workstation / operation name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// operator, setter or subcontract (French labels accepted)
    #[arg(long = "type", short = 't')]
    pub op_type: Option<OperationType>,

    /// Machine or supplier
    #[arg(long, short = 'm')]
    pub machine: Option<String>,

    /// Units produced per hour
    #[arg(long)]
    pub cadence: Option<String>,

    /// Hourly rate
    #[arg(long)]
    pub rate: Option<String>,

    /// Flat subcontracting cost for the batch
    #[arg(long)]
    pub subcontract_cost: Option<String>,

    /// Efficiency percentage (operator lines)
    #[arg(long)]
    pub trg: Option<String>,

    /// People on the station (operator lines)
    #[arg(long)]
    pub crew: Option<String>,
}

impl OpFields {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.op_type.is_none()
            && self.machine.is_none()
            && self.cadence.is_none()
            && self.rate.is_none()
            && self.subcontract_cost.is_none()
            && self.trg.is_none()
            && self.crew.is_none()
    }

    fn apply(self, line: &mut OperationLine) {
        if let Some(name) = self.name {
            line.name = name;
        }
        if let Some(op_type) = self.op_type {
            line.op_type = op_type;
        }
        if let Some(machine) = self.machine {
            line.machine = machine;
        }
        if let Some(v) = self.cadence {
            line.cadence_h = coerce_str(&v);
        }
        if let Some(v) = self.rate {
            line.hourly_rate = coerce_str(&v);
        }
        if let Some(v) = self.subcontract_cost {
            line.subcontract_cost = coerce_str(&v);
        }
        if let Some(v) = self.trg {
            line.trg_pct = coerce_str(&v);
        }
        if let Some(v) = self.crew {
            line.crew = coerce_str(&v);
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub fields: OpFields,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Line reference: #N, N, full key or unique key prefix
    pub line: String,

    #[command(flatten)]
    pub fields: OpFields,
}

#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// Line reference: #N, N, full key or unique key prefix
    pub line: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("key", "KEY", 14),
    ColumnDef::new("name", "NAME", 24),
    ColumnDef::new("type", "TYPE", 12),
    ColumnDef::new("machine", "MACHINE", 20),
    ColumnDef::new("cadence_h", "CADENCE/H", 10),
    ColumnDef::new("hourly_rate", "RATE", 10),
    ColumnDef::new("trg_pct", "TRG %", 6),
    ColumnDef::new("crew", "CREW", 5),
    ColumnDef::new("subcontract_cost", "SUBCONTRACT", 12),
    ColumnDef::new("batch_cost", "BATCH COST", 14),
];

pub fn run(cmd: OpCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OpCommands::List => run_list(global),
        OpCommands::Add(args) => run_add(args, global),
        OpCommands::Set(args) => run_set(args, global),
        OpCommands::Rm(args) => run_rm(args, global),
        OpCommands::Import(args) => run_import(args, global),
    }
}

fn row(position: usize, op: &OperationLine, batch: f64) -> TableRow {
    let mut row = TableRow::new(position)
        .cell("key", CellValue::Key(op.id.to_string()))
        .cell("name", CellValue::Text(op.name.clone()))
        .cell("type", CellValue::OpType(op.op_type))
        .cell("machine", CellValue::Text(op.machine.clone()));

    row = if op.is_subcontract() {
        row.cell("subcontract_cost", CellValue::Money(op.subcontract_cost))
    } else {
        row.cell("cadence_h", CellValue::Qty(op.cadence_h))
            .cell("hourly_rate", CellValue::Money(op.hourly_rate))
    };
    if op.op_type == OperationType::Operator {
        row = row
            .cell("trg_pct", CellValue::Qty(op.trg_pct))
            .cell("crew", CellValue::Qty(op.crew));
    }

    row.cell("batch_cost", CellValue::Money(operation_line_cost(op, batch)))
}

/// Render the operation table with per-line batch cost and a subtotal
pub fn render_list(scenario: &Scenario, currency: &str, format: OutputFormat, quiet: bool) -> String {
    let batch = parse_at_least_one(scenario.batch_qty);
    let rows: Vec<TableRow> = scenario
        .operations
        .iter()
        .enumerate()
        .map(|(i, op)| row(i + 1, op, batch))
        .collect();

    let total = scenario.results().operation_total;
    TableFormatter::new(COLUMNS, "operation")
        .with_footer(format!(
            "Operations total for {} unit(s): {}",
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
            print!("{}", to_structured(&session.scenario.operations, format)?);
        }
        _ => print!(
            "{}",
            render_list(&session.scenario, session.currency(), format, global.quiet)
        ),
    }
    Ok(())
}

fn prompt_line(fields: OpFields) -> Result<OperationLine> {
    let theme = ColorfulTheme::default();

    let name: String = Input::with_theme(&theme)
        .with_prompt("Operation")
        .with_initial_text(fields.name.unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    let types = [
        OperationType::Operator,
        OperationType::Setter,
        OperationType::Subcontract,
    ];
    let default_idx = fields
        .op_type
        .and_then(|t| types.iter().position(|x| *x == t))
        .unwrap_or(0);
    let idx = Select::with_theme(&theme)
        .with_prompt("Type")
        .items(&types)
        .default(default_idx)
        .interact()
        .into_diagnostic()?;
    let op_type = types[idx];

    let machine: String = Input::with_theme(&theme)
        .with_prompt(if op_type == OperationType::Subcontract {
            "Supplier"
        } else {
            "Machine"
        })
        .with_initial_text(fields.machine.unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    let ask = |prompt: &str, default: Option<String>, fallback: &str| -> Result<f64> {
        let value: String = Input::with_theme(&theme)
            .with_prompt(prompt)
            .default(default.unwrap_or_else(|| fallback.to_string()))
            .interact_text()
            .into_diagnostic()?;
        Ok(coerce_str(&value))
    };

    let mut line = OperationLine::new(name, op_type).with_machine(machine);
    if op_type == OperationType::Subcontract {
        line.subcontract_cost = ask("Subcontract cost (batch)", fields.subcontract_cost, "0")?;
    } else {
        line.cadence_h = ask("Cadence (units/hour)", fields.cadence, "0")?;
        line.hourly_rate = ask("Hourly rate", fields.rate, "0")?;
        if op_type == OperationType::Operator {
            line.trg_pct = ask("TRG %", fields.trg, "100")?;
            line.crew = ask("Crew", fields.crew, "1")?;
        }
    }
    Ok(line)
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let line = if args.interactive {
        prompt_line(args.fields)?
    } else {
        let mut line = OperationLine::blank();
        args.fields.apply(&mut line);
        line
    };

    let position = session.scenario.operations.len() + 1;
    let key = session.scenario.add_operation(line).id.to_string();
    session.save()?;

    if !global.quiet {
        println!(
            "{} Added operation #{} {}",
            style("✓").green(),
            position,
            style(&key).cyan()
        );
        print_operation_total(&session);
    }
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    if args.fields.is_empty() {
        return Err(miette::miette!(
            "Nothing to update (use --name, --type, --machine, --cadence, --rate, --subcontract-cost, --trg or --crew)"
        ));
    }

    let mut session = Session::open(global)?;
    let line = session
        .scenario
        .operation_mut(&args.line)
        .map_err(|e| miette::miette!("{}", e))?;
    args.fields.apply(line);
    let key = line.id.to_string();
    session.save()?;

    if !global.quiet {
        println!("{} Updated operation {}", style("✓").green(), style(&key).cyan());
        print_operation_total(&session);
    }
    Ok(())
}

fn run_rm(args: RmArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let removed = session
        .scenario
        .remove_operation(&args.line)
        .map_err(|e| miette::miette!("{}", e))?;
    session.save()?;

    if !global.quiet {
        println!(
            "{} Removed operation {} {}",
            style("✓").green(),
            style(removed.id.to_string()).cyan(),
            removed.name
        );
        print_operation_total(&session);
    }
    Ok(())
}

fn run_import(args: LineImportArgs, global: &GlobalOpts) -> Result<()> {
    let Some(path) = args.file.as_ref().filter(|_| !args.template) else {
        print_template(OPERATION_HEADERS, OPERATION_EXAMPLE, "op");
        return Ok(());
    };

    let mut session = Session::open(global)?;
    let file = File::open(path).into_diagnostic()?;
    let (lines, stats) = read_operations(BufReader::new(file), args.skip_errors)?;

    if args.dry_run {
        println!(
            "{} {} operation line(s) would be {} ({} row(s), {} error(s))",
            style("○").dim(),
            stats.lines_created,
            if args.replace { "loaded" } else { "appended" },
            stats.rows_processed,
            stats.errors
        );
        return Ok(());
    }

    if args.replace {
        session.scenario.operations.clear();
    }
    session.scenario.operations.extend(lines);
    session.save()?;
    tracing::info!(created = stats.lines_created, "operations imported");

    if !global.quiet {
        println!(
            "{} Imported {} operation line(s) from {}",
            style("✓").green(),
            style(stats.lines_created).cyan(),
            path.display()
        );
        if stats.errors > 0 {
            println!("  {} row(s) skipped", style(stats.errors).yellow());
        }
        print_operation_total(&session);
    }
    Ok(())
}

fn print_operation_total(session: &Session) {
    let results = session.scenario.results();
    println!(
        "  Operations total: {}",
        style(format_money(results.operation_total, session.currency())).yellow()
    );
}
