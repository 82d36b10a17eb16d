//! `costsim catalog` command - browse families, articles and technical data

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::commands::utils::{effective_format, load_catalog, to_structured};
use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Catalog, Config};

#[derive(clap::Args, Debug)]
pub struct CatalogArgs {
    /// Family to list articles of
    pub family: Option<String>,

    /// Article to list technical data of
    pub article: Option<String>,
}

/// What a catalog query lists
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    article: Option<String>,
    entries: Vec<String>,
}

pub fn run(args: CatalogArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let catalog = load_catalog(&config)?;
    let listing = query(&catalog, args.family, args.article)?;

    let format = effective_format(global, &config);
    let output = match format {
        OutputFormat::Json | OutputFormat::Yaml => to_structured(&listing, format)?,
        OutputFormat::Csv => {
            let mut out = format!("{}\n", listing.level);
            for entry in &listing.entries {
                out.push_str(&escape_csv(entry));
                out.push('\n');
            }
            out
        }
        OutputFormat::Md => {
            let mut out = format!("| {} |\n|---|\n", listing.level);
            for entry in &listing.entries {
                out.push_str(&format!("| {} |\n", entry));
            }
            out
        }
        OutputFormat::Tsv => listing
            .entries
            .iter()
            .map(|e| format!("{}\n", e))
            .collect(),
        OutputFormat::Auto => render_terminal(&listing, global.quiet),
    };

    print!("{}", output);
    Ok(())
}

fn query(catalog: &Catalog, family: Option<String>, article: Option<String>) -> Result<Listing> {
    match (family, article) {
        (None, _) => Ok(Listing {
            level: "family",
            family: None,
            article: None,
            entries: catalog.families().map(str::to_string).collect(),
        }),
        (Some(family), None) => {
            if !catalog.has_family(&family) {
                return Err(miette::miette!("Unknown family '{}'", family));
            }
            Ok(Listing {
                level: "article",
                entries: catalog.articles(&family).to_vec(),
                family: Some(family),
                article: None,
            })
        }
        (Some(family), Some(article)) => {
            if !catalog.has_article(&family, &article) {
                return Err(miette::miette!(
                    "Unknown article '{}' in family '{}'",
                    article,
                    family
                ));
            }
            Ok(Listing {
                level: "technical",
                entries: catalog.technical(&family, &article).to_vec(),
                family: Some(family),
                article: Some(article),
            })
        }
    }
}

fn render_terminal(listing: &Listing, quiet: bool) -> String {
    let mut out = String::new();
    if !quiet {
        let title = match (&listing.family, &listing.article) {
            (Some(f), Some(a)) => format!("Technical data of {} / {}", f, a),
            (Some(f), None) => format!("Articles of {}", f),
            _ => "Families".to_string(),
        };
        out.push_str(&format!("{}\n", style(title).bold()));
    }
    if listing.entries.is_empty() {
        out.push_str(&format!("  {}\n", style("(none)").dim()));
    }
    for entry in &listing.entries {
        out.push_str(&format!("  {}\n", style(entry).cyan()));
    }
    out
}
