//! `costsim set` command - scenario header fields and article selection

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::Session;
use crate::cli::helpers::{format_money, format_qty};
use crate::cli::GlobalOpts;
use crate::core::catalog::Catalog;
use crate::core::coerce::coerce_str;
use crate::entities::scenario::Scenario;

#[derive(Subcommand, Debug)]
pub enum SetCommands {
    /// Units per batch
    Batch { value: String },

    /// Sale price per unit, before discount
    Price { value: String },

    /// End-of-year discount, percent of gross revenue
    Discount { value: String },

    /// Overhead, percent of net revenue
    Overhead { value: String },

    /// Article family (clears article and technical data)
    Family { value: String },

    /// Article reference (clears technical data)
    Article { value: String },

    /// Technical data of the selected article
    Technical { value: String },
}

pub fn run(cmd: SetCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let catalog = session.catalog()?;

    let (field, shown) = apply(&mut session.scenario, &catalog, cmd);
    session.save()?;

    if !global.quiet {
        println!(
            "{} {} {} {}",
            style("✓").green(),
            style(field).cyan(),
            style("→").dim(),
            style(&shown).yellow()
        );

        let results = session.scenario.results();
        let margin = format_money(results.margin, session.currency());
        let margin = if results.is_loss() {
            style(margin).red()
        } else {
            style(margin).green()
        };
        println!("  Margin: {}", margin);
    }
    Ok(())
}

/// Apply a `set` command; returns the field name and the stored value
fn apply(scenario: &mut Scenario, catalog: &Catalog, cmd: SetCommands) -> (&'static str, String) {
    match cmd {
        SetCommands::Batch { value } => {
            scenario.batch_qty = coerce_str(&value);
            ("batch", format_qty(scenario.batch_qty))
        }
        SetCommands::Price { value } => {
            scenario.sale_price = coerce_str(&value);
            ("price", format_qty(scenario.sale_price))
        }
        SetCommands::Discount { value } => {
            scenario.eoy_discount_pct = coerce_str(&value);
            ("discount", format!("{} %", format_qty(scenario.eoy_discount_pct)))
        }
        SetCommands::Overhead { value } => {
            scenario.overhead_pct = coerce_str(&value);
            ("overhead", format!("{} %", format_qty(scenario.overhead_pct)))
        }
        SetCommands::Family { value } => {
            if !catalog.has_family(&value) {
                tracing::warn!(family = %value, "family not in catalog");
            }
            scenario.select_family(value);
            ("family", scenario.family.clone())
        }
        SetCommands::Article { value } => {
            if scenario.family.is_empty() {
                // Pick the family from the catalog when it is unambiguous
                if let Some(family) = catalog.family_of(&value) {
                    scenario.select_family(family);
                }
            }
            if !catalog.has_article(&scenario.family, &value) {
                tracing::warn!(family = %scenario.family, article = %value, "article not in catalog");
            }
            scenario.select_article(value);
            ("article", scenario.article_ref.clone())
        }
        SetCommands::Technical { value } => {
            if !catalog.has_technical(&scenario.family, &scenario.article_ref, &value) {
                tracing::warn!(
                    article = %scenario.article_ref,
                    technical = %value,
                    "technical data not in catalog"
                );
            }
            scenario.select_technical(value);
            ("technical", scenario.selected_technical.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(scenario: &mut Scenario, cmd: SetCommands) -> String {
        apply(scenario, &Catalog::builtin(), cmd).1
    }

    #[test]
    fn test_numeric_fields_are_coerced() {
        let mut s = Scenario::default();
        assert_eq!(set(&mut s, SetCommands::Price { value: "12,5".into() }), "12.5");
        assert_eq!(s.sale_price, 12.5);

        set(&mut s, SetCommands::Batch { value: "lots".into() });
        assert_eq!(s.batch_qty, 0.0);
        // Still computable: batch is floored at 1 when costing
        assert_eq!(s.results().batch_qty, 1.0);

        assert_eq!(set(&mut s, SetCommands::Overhead { value: "12".into() }), "12 %");
    }

    #[test]
    fn test_selection_cascade() {
        let mut s = Scenario::default();
        set(&mut s, SetCommands::Family { value: "Tôlerie".into() });
        set(&mut s, SetCommands::Article { value: "ART-0001".into() });
        set(&mut s, SetCommands::Technical { value: "Laser A".into() });
        assert_eq!(s.selected_technical, "Laser A");

        set(&mut s, SetCommands::Family { value: "Usinage".into() });
        assert_eq!(s.article_ref, "");
        assert_eq!(s.selected_technical, "");
    }

    #[test]
    fn test_article_fills_family_from_catalog() {
        let mut s = Scenario::default();
        set(&mut s, SetCommands::Article { value: "ART-1001".into() });
        assert_eq!(s.family, "Usinage");
        assert_eq!(s.article_ref, "ART-1001");
    }

    #[test]
    fn test_unknown_values_are_accepted() {
        let mut s = Scenario::default();
        set(&mut s, SetCommands::Family { value: "Fonderie".into() });
        set(&mut s, SetCommands::Article { value: "ART-X".into() });
        assert_eq!(s.family, "Fonderie");
        assert_eq!(s.article_ref, "ART-X");
    }
}
