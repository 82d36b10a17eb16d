//! CSV import of material and operation lines

use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use crate::cli::helpers::truncate_str;
use crate::core::coerce::coerce_str;
use crate::entities::material::MaterialLine;
use crate::entities::operation::{OperationLine, OperationType};

pub const MATERIAL_HEADERS: &[&str] = &["name", "qty", "unit_cost"];
pub const MATERIAL_EXAMPLE: &[&str] = &["Acier S235", "2", "3.9"];

pub const OPERATION_HEADERS: &[&str] = &[
    "name",
    "type",
    "machine",
    "cadence_h",
    "hourly_rate",
    "subcontract_cost",
    "trg_pct",
    "crew",
];
pub const OPERATION_EXAMPLE: &[&str] = &[
    "Découpe laser",
    "operator",
    "Laser Bystronic",
    "10",
    "55",
    "",
    "100",
    "1",
];

/// Options shared by `mat import` and `op import`
#[derive(clap::Args, Debug)]
pub struct LineImportArgs {
    /// CSV file to import (required unless --template)
    #[arg(required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// Print a CSV template with headers and an example row
    #[arg(long)]
    pub template: bool,

    /// Replace the existing lines instead of appending
    #[arg(long)]
    pub replace: bool,

    /// Validate without modifying the scenario
    #[arg(long)]
    pub dry_run: bool,

    /// Continue past invalid rows
    #[arg(long)]
    pub skip_errors: bool,
}

/// Import statistics
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub rows_processed: usize,
    pub lines_created: usize,
    pub errors: usize,
}

/// Print a CSV template for a line kind
pub fn print_template(headers: &[&str], example: &[&str], kind: &str) {
    println!("{}", headers.join(","));
    println!("{}", example.join(","));

    // Usage hint on stderr so it doesn't interfere with redirected output
    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: costsim {} import --template > {}.csv",
        style("→").blue(),
        kind,
        kind
    );
}

/// Build a map from header name to column index
pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a field value from a CSV record
pub fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Read material lines from CSV (`name,qty,unit_cost`)
pub fn read_materials<R: Read>(
    reader: R,
    skip_errors: bool,
) -> Result<(Vec<MaterialLine>, ImportStats)> {
    read_rows(reader, skip_errors, |record, headers| {
        let name = get_field(record, headers, "name")?;
        let number = |f: &str| get_field(record, headers, f).map(|v| coerce_str(&v));
        Some(MaterialLine::new(
            name,
            number("qty").unwrap_or(1.0),
            number("unit_cost").unwrap_or(0.0),
        ))
    })
}

/// Read operation lines from CSV
/// (`name,type,machine,cadence_h,hourly_rate,subcontract_cost,trg_pct,crew`)
pub fn read_operations<R: Read>(
    reader: R,
    skip_errors: bool,
) -> Result<(Vec<OperationLine>, ImportStats)> {
    read_rows(reader, skip_errors, |record, headers| {
        let name = get_field(record, headers, "name")?;
        let number = |f: &str| get_field(record, headers, f).map(|v| coerce_str(&v));
        let op_type = get_field(record, headers, "type")
            .map(|t| OperationType::from_label_or_keyword(&t))
            .unwrap_or_default();

        Some(
            OperationLine::new(name, op_type)
                .with_machine(get_field(record, headers, "machine").unwrap_or_default())
                .with_cadence(number("cadence_h").unwrap_or(0.0))
                .with_rate(number("hourly_rate").unwrap_or(0.0))
                .with_subcontract_cost(number("subcontract_cost").unwrap_or(0.0))
                .with_trg(number("trg_pct").unwrap_or(100.0))
                .with_crew(number("crew").unwrap_or(1.0)),
        )
    })
}

/// Shared row loop; `build` returns `None` when the row has no name
fn read_rows<R, T, F>(reader: R, skip_errors: bool, build: F) -> Result<(Vec<T>, ImportStats)>
where
    R: Read,
    F: Fn(&StringRecord, &HashMap<String, usize>) -> Option<T>,
{
    let mut stats = ImportStats::default();
    let mut lines = Vec::new();

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);
    if !header_map.contains_key("name") {
        return Err(miette::miette!(
            "CSV header must contain a 'name' column (found: {})",
            headers.iter().collect::<Vec<_>>().join(", ")
        ));
    }

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2; // +2 for 1-indexed and header row
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!(
                    "{} Row {}: CSV parse error: {}",
                    style("✗").red(),
                    row_num,
                    e
                );
                stats.errors += 1;
                if !skip_errors {
                    return Err(miette::miette!("CSV parse error at row {}: {}", row_num, e));
                }
                continue;
            }
        };

        match build(&record, &header_map) {
            Some(line) => {
                lines.push(line);
                stats.lines_created += 1;
            }
            None => {
                eprintln!(
                    "{} Row {}: Missing required field 'name' ({})",
                    style("✗").red(),
                    row_num,
                    truncate_str(&record.iter().collect::<Vec<_>>().join(","), 40)
                );
                stats.errors += 1;
                if !skip_errors {
                    return Err(miette::miette!(
                        "Missing required field 'name' at row {}",
                        row_num
                    ));
                }
            }
        }
    }

    tracing::debug!(
        rows = stats.rows_processed,
        created = stats.lines_created,
        errors = stats.errors,
        "CSV lines read"
    );
    Ok((lines, stats))
}
