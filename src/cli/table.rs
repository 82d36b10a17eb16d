//! Table formatting for line list commands
//!
//! Rows are built from typed cells and rendered as an aligned terminal
//! table, CSV, TSV or Markdown. Column widths follow the content, capped at
//! the width given in the column definition.

use console::{measure_text_width, style};

use crate::cli::helpers::{escape_csv, format_qty, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::operation::OperationType;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Line key (cyan, shortened in terminal output)
    Key(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Operation type with color coding
    OpType(OperationType),
    /// Amount with two decimals
    Money(f64),
    /// Quantity or rate without trailing zeros
    Qty(f64),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    fn plain(&self) -> String {
        match self {
            CellValue::Key(k) => k.clone(),
            CellValue::Text(s) => s.clone(),
            CellValue::OpType(t) => t.to_string(),
            CellValue::Money(v) => format!("{:.2}", v),
            CellValue::Qty(v) => format_qty(*v),
            CellValue::Empty => String::new(),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Money(_) | CellValue::Qty(_))
    }

    /// Format for terminal output (with colors if terminal)
    pub fn format_terminal(&self, width: usize) -> String {
        match self {
            CellValue::Key(k) => {
                let display = truncate_str(k, width);
                pad(&style(display).cyan().to_string(), width, false)
            }
            CellValue::Text(s) => pad(&truncate_str(s, width), width, false),
            CellValue::OpType(t) => {
                let s = t.to_string();
                let styled = match t {
                    OperationType::Operator => style(s),
                    OperationType::Setter => style(s).yellow(),
                    OperationType::Subcontract => style(s).magenta(),
                };
                pad(&styled.to_string(), width, false)
            }
            CellValue::Money(_) | CellValue::Qty(_) => pad(&self.plain(), width, true),
            CellValue::Empty => pad(&style("-").dim().to_string(), width, false),
        }
    }

    /// Format for TSV output (raw values, no colors)
    pub fn format_tsv(&self) -> String {
        self.plain().replace(['\t', '\n'], " ")
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        escape_csv(&self.plain())
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        match self {
            CellValue::Empty => "-".to_string(),
            other => other.plain().replace('|', "\\|"),
        }
    }

    /// Display width of the cell content
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            other => other.plain().chars().count(),
        }
    }
}

/// Pad a possibly-styled string to `width` visible columns
fn pad(s: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(measure_text_width(s)));
    if right_align {
        format!("{}{}", fill, s)
    } else {
        format!("{}{}", s, fill)
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
#[derive(Debug, Clone)]
pub struct TableRow {
    /// 1-based position in the line list
    pub position: usize,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that renders rows in the various text formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun: &'static str,
    footer: Option<String>,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], noun: &'static str) -> Self {
        Self {
            columns,
            noun,
            footer: None,
            show_summary: true,
        }
    }

    /// Line printed under the terminal table (e.g. a subtotal)
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Suppress the "N line(s)" summary
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Render rows in the given format (json/yaml are handled by callers)
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_delimited(rows, ",", CellValue::format_csv),
            OutputFormat::Tsv => self.render_delimited(rows, "\t", CellValue::format_tsv),
            OutputFormat::Md => self.render_md(rows),
            _ => self.render_terminal(rows),
        }
    }

    fn widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let pos_width = rows
            .iter()
            .map(|r| r.position.to_string().len() + 1)
            .max()
            .unwrap_or(1)
            .max(1);

        let mut widths = vec![pos_width];
        for col in self.columns {
            let content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(CellValue::display_width)
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(content).min(col.width.max(col.header.len())));
        }
        widths
    }

    fn render_terminal(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();

        if rows.is_empty() {
            out.push_str(&format!("No {} lines.\n", self.noun));
            return out;
        }

        let widths = self.widths(rows);

        let mut header = vec![pad(&style("#").bold().dim().to_string(), widths[0], false)];
        for (col, w) in self.columns.iter().zip(&widths[1..]) {
            let numeric = rows
                .first()
                .and_then(|r| r.get(col.key))
                .is_some_and(CellValue::is_numeric);
            header.push(pad(&style(col.header).bold().to_string(), *w, numeric));
        }
        out.push_str(&header.join("  "));
        out.push('\n');

        let total: usize = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
        out.push_str(&"-".repeat(total));
        out.push('\n');

        for row in rows {
            let mut parts = vec![pad(&format!("#{}", row.position), widths[0], false)];
            for (col, w) in self.columns.iter().zip(&widths[1..]) {
                parts.push(match row.get(col.key) {
                    Some(v) => v.format_terminal(*w),
                    None => CellValue::Empty.format_terminal(*w),
                });
            }
            out.push_str(parts.join("  ").trim_end());
            out.push('\n');
        }

        if let Some(footer) = &self.footer {
            out.push_str(&"-".repeat(total));
            out.push('\n');
            out.push_str(footer);
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {} line(s). Use {} or a key prefix to reference a line.\n",
                style(rows.len()).cyan(),
                self.noun,
                style("#N").cyan()
            ));
        }

        out
    }

    fn render_delimited(
        &self,
        rows: &[TableRow],
        sep: &str,
        cell: fn(&CellValue) -> String,
    ) -> String {
        let mut out = String::new();
        let mut header = vec!["position"];
        header.extend(self.columns.iter().map(|c| c.key));
        out.push_str(&header.join(sep));
        out.push('\n');

        for row in rows {
            let mut parts = vec![row.position.to_string()];
            parts.extend(
                self.columns
                    .iter()
                    .map(|c| row.get(c.key).map(cell).unwrap_or_default()),
            );
            out.push_str(&parts.join(sep));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let mut header = vec!["#"];
        header.extend(self.columns.iter().map(|c| c.header));
        out.push_str(&format!("| {} |\n", header.join(" | ")));
        out.push_str(&format!("|{}\n", "---|".repeat(header.len())));

        for row in rows {
            let mut parts = vec![row.position.to_string()];
            parts.extend(self.columns.iter().map(|c| {
                row.get(c.key)
                    .map(CellValue::format_md)
                    .unwrap_or_else(|| "-".to_string())
            }));
            out.push_str(&format!("| {} |\n", parts.join(" | ")));
        }

        if let Some(footer) = &self.footer {
            out.push('\n');
            out.push_str(&format!("**{}**\n", footer.trim()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("name", "NAME", 20),
        ColumnDef::new("qty", "QTY", 8),
        ColumnDef::new("cost", "COST", 10),
    ];

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new(1)
                .cell("name", CellValue::Text("Acier, S235".to_string()))
                .cell("qty", CellValue::Qty(2.0))
                .cell("cost", CellValue::Money(780.0)),
            TableRow::new(2)
                .cell("name", CellValue::Text("Vis | M6".to_string()))
                .cell("qty", CellValue::Qty(0.5)),
        ]
    }

    #[test]
    fn test_render_csv() {
        let out = TableFormatter::new(COLUMNS, "material").render(&rows(), OutputFormat::Csv);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "position,name,qty,cost");
        assert_eq!(lines[1], "1,\"Acier, S235\",2,780.00");
        assert_eq!(lines[2], "2,Vis | M6,0.5,");
    }

    #[test]
    fn test_render_tsv() {
        let out = TableFormatter::new(COLUMNS, "material").render(&rows(), OutputFormat::Tsv);
        assert!(out.starts_with("position\tname\tqty\tcost\n"));
        assert!(out.contains("1\tAcier, S235\t2\t780.00\n"));
    }

    #[test]
    fn test_render_md_escapes_pipes() {
        let out = TableFormatter::new(COLUMNS, "material")
            .with_footer("Total 780.00")
            .render(&rows(), OutputFormat::Md);
        assert!(out.starts_with("| # | NAME | QTY | COST |\n|---|---|---|---|\n"));
        assert!(out.contains("| 2 | Vis \\| M6 | 0.5 | - |"));
        assert!(out.contains("**Total 780.00**"));
    }

    #[test]
    fn test_render_terminal() {
        let out = TableFormatter::new(COLUMNS, "material").render(&rows(), OutputFormat::Auto);
        assert!(out.contains("#1"));
        assert!(out.contains("780.00"));
        assert!(out.contains("material line(s)"));

        let empty = TableFormatter::new(COLUMNS, "operation").render(&[], OutputFormat::Auto);
        assert_eq!(empty, "No operation lines.\n");
    }
}
