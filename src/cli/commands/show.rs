//! `costsim show` command - cost breakdown, margin and break-even price

use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{to_structured, Session};
use crate::cli::commands::{mat, op};
use crate::cli::helpers::{bar, escape_csv, format_money, format_pct, format_qty};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::costing::ResultSet;
use crate::entities::scenario::Scenario;

/// Width of the breakdown bars
const BAR_WIDTH: usize = 24;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Also list materials and operations with their batch cost
    #[arg(long, short = 'l')]
    pub lines: bool,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let results = session.scenario.results();
    let format = session.format(global);

    let output = match format {
        OutputFormat::Json | OutputFormat::Yaml => to_structured(&results, format)?,
        OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md => {
            render_rows(&results, format)
        }
        OutputFormat::Auto => {
            let mut out = render_summary(&session.scenario, &results, session.currency());
            if !global.quiet {
                out.push('\n');
                out.push_str(&render_breakdown(&results));
            }
            if args.lines {
                out.push('\n');
                out.push_str(&mat::render_list(&session.scenario, session.currency(), format, true));
                out.push('\n');
                out.push_str(&op::render_list(&session.scenario, session.currency(), format, true));
            }
            out
        }
    };

    print!("{}", output);
    Ok(())
}

/// Result figures as (key, value) pairs; break-even is empty when undefined
pub fn result_rows(results: &ResultSet) -> Vec<(&'static str, String)> {
    let number = |v: f64| format!("{:.2}", v);
    vec![
        ("batchQty", format_qty(results.batch_qty)),
        ("materialTotal", number(results.material_total)),
        ("operationTotal", number(results.operation_total)),
        ("directCosts", number(results.direct_costs)),
        ("overhead", number(results.overhead)),
        ("totalCost", number(results.total_cost)),
        ("unitCost", number(results.unit_cost)),
        ("netRevenue", number(results.net_revenue)),
        ("margin", number(results.margin)),
        ("marginPerUnit", number(results.margin_per_unit)),
        ("marginPct", number(results.margin_pct)),
        (
            "breakEvenUnit",
            results.break_even_unit.price().map(number).unwrap_or_default(),
        ),
    ]
}

fn render_rows(results: &ResultSet, format: OutputFormat) -> String {
    let rows = result_rows(results);
    let mut out = String::new();
    match format {
        OutputFormat::Csv => {
            out.push_str("metric,value\n");
            for (k, v) in rows {
                out.push_str(&format!("{},{}\n", k, escape_csv(&v)));
            }
        }
        OutputFormat::Md => {
            let mut table = Builder::default();
            table.push_record(["Metric", "Value"]);
            for (k, v) in rows {
                let v = if v.is_empty() { "-".to_string() } else { v };
                table.push_record([k.to_string(), v]);
            }
            out.push_str(&table.build().with(Style::markdown()).to_string());
            out.push('\n');
        }
        _ => {
            for (k, v) in rows {
                out.push_str(&format!("{}\t{}\n", k, v));
            }
        }
    }
    out
}

fn render_summary(scenario: &Scenario, results: &ResultSet, currency: &str) -> String {
    let money = |v: f64| format!("{:>14}", format_money(v, currency));
    let mut out = String::new();

    let selection: Vec<&str> = [
        scenario.family.as_str(),
        scenario.article_ref.as_str(),
        scenario.selected_technical.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();
    let article = if selection.is_empty() {
        style("(no article selected)".to_string()).dim()
    } else {
        style(selection.join(" / ")).cyan()
    };

    out.push_str(&format!("{:<18}{}\n", "Article", article));
    out.push_str(&format!(
        "{:<18}{} unit(s)\n",
        "Batch",
        format_qty(results.batch_qty)
    ));
    out.push('\n');

    out.push_str(&format!("{}\n", style("Costs").bold()));
    out.push_str(&format!("  {:<16}{}\n", "Material", money(results.material_total)));
    out.push_str(&format!("  {:<16}{}\n", "Operations", money(results.operation_total)));
    out.push_str(&format!("  {:<16}{}\n", "Direct costs", money(results.direct_costs)));
    out.push_str(&format!(
        "  {:<16}{}  {}\n",
        "Overhead",
        money(results.overhead),
        style(format!("{} of net revenue", format_pct(scenario.overhead_pct))).dim()
    ));
    out.push_str(&format!(
        "  {:<16}{}\n",
        "Total cost",
        style(money(results.total_cost)).bold()
    ));
    out.push_str(&format!("  {:<16}{}\n", "Unit cost", money(results.unit_cost)));
    out.push('\n');

    out.push_str(&format!("{}\n", style("Revenue").bold()));
    out.push_str(&format!(
        "  {:<16}{}  {}\n",
        "Net revenue",
        money(results.net_revenue),
        style(format!(
            "{}/unit, {} year-end discount",
            format_money(scenario.sale_price, currency),
            format_pct(scenario.eoy_discount_pct)
        ))
        .dim()
    ));

    let paint = |s: String| {
        if results.is_loss() {
            style(s).red().bold()
        } else {
            style(s).green().bold()
        }
    };
    out.push_str(&format!("  {:<16}{}\n", "Margin", paint(money(results.margin))));
    out.push_str(&format!(
        "  {:<16}{}\n",
        "Margin / unit",
        paint(money(results.margin_per_unit))
    ));
    out.push_str(&format!(
        "  {:<16}{}\n",
        "Margin %",
        paint(format!("{:>14}", format_pct(results.margin_pct)))
    ));

    let break_even = match results.break_even_unit.price() {
        Some(p) => money(p),
        None => format!("{:>14}", "undefined"),
    };
    out.push_str(&format!("  {:<16}{}\n", "Break-even price", break_even));

    out
}

fn render_breakdown(results: &ResultSet) -> String {
    let mut out = format!("{}\n", style("Cost breakdown").bold());
    let total: f64 = results.chart.iter().map(|s| s.value.max(0.0)).sum();

    for slice in &results.chart {
        let share = if total > 0.0 {
            slice.value.max(0.0) / total
        } else {
            0.0
        };
        out.push_str(&format!(
            "  {:<12}{} {:>7}\n",
            slice.name.to_string(),
            bar(share, BAR_WIDTH),
            format_pct(share * 100.0)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_rows_for_sample() {
        let rows = result_rows(&Scenario::sample().results());
        let get = |k: &str| rows.iter().find(|(key, _)| *key == k).map(|(_, v)| v.clone());

        assert_eq!(get("materialTotal").as_deref(), Some("780.00"));
        assert_eq!(get("operationTotal").as_deref(), Some("550.00"));
        assert_eq!(get("netRevenue").as_deref(), Some("1212.50"));
        assert_eq!(get("overhead").as_deref(), Some("145.50"));
        assert_eq!(get("totalCost").as_deref(), Some("1475.50"));
        assert_eq!(get("margin").as_deref(), Some("-263.00"));
    }

    #[test]
    fn test_undefined_break_even_is_blank() {
        let mut s = Scenario::sample();
        s.overhead_pct = 100.0;
        let rows = result_rows(&s.results());
        let (_, v) = rows.iter().find(|(k, _)| *k == "breakEvenUnit").unwrap();
        assert!(v.is_empty());

        let md = render_rows(&s.results(), OutputFormat::Md);
        let row = md.lines().find(|l| l.contains("breakEvenUnit")).unwrap();
        let cells: Vec<&str> = row.split('|').map(str::trim).collect();
        assert_eq!(cells, vec!["", "breakEvenUnit", "-", ""]);
    }

    #[test]
    fn test_render_csv_rows() {
        let csv = render_rows(&Scenario::sample().results(), OutputFormat::Csv);
        assert!(csv.starts_with("metric,value\n"));
        assert!(csv.contains("totalCost,1475.50\n"));
    }

    #[test]
    fn test_breakdown_shares() {
        let out = render_breakdown(&Scenario::sample().results());
        assert!(out.contains("Material"));
        assert!(out.contains("Operations"));
        assert!(out.contains("Overhead"));
        // 780 / 1475.5
        assert!(out.contains("52.9 %"));
    }
}
