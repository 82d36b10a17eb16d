//! `costsim load` command - replace material and operation lines from the ERP

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::Session;
use crate::cli::helpers::format_money;
use crate::cli::GlobalOpts;
use crate::erp::ErpClient;

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    /// Article reference to load (default: the scenario's article)
    #[arg(long, short = 'a')]
    pub article: Option<String>,

    /// ERP base URL (overrides config and COSTSIM_API_BASE)
    #[arg(long)]
    pub api_base: Option<String>,
}

pub fn run(args: LoadArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let article = args
        .article
        .clone()
        .unwrap_or_else(|| session.scenario.article_ref.clone());
    let article = article.trim().to_string();
    if article.is_empty() {
        return Err(miette::miette!(
            help = "Select one with `costsim set article <REF>` or pass --article",
            "No article selected"
        ));
    }

    let api_base = args
        .api_base
        .as_deref()
        .unwrap_or_else(|| session.config.api_base());
    let client = ErpClient::new(api_base, session.config.request_timeout())
        .map_err(|e| miette::miette!("{}", e))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    // Nothing is written unless both endpoints answered
    let data = runtime
        .block_on(client.load(&article))
        .map_err(|e| miette::miette!("ERP load failed for {}: {}", article, e))?;

    if session.scenario.article_ref != article {
        session.scenario.select_article(article.clone());
    }
    let (materials, operations) = (data.materials.len(), data.operations.len());
    data.apply(&mut session.scenario);
    session.save()?;

    if !global.quiet {
        println!(
            "{} Loaded {} from {}",
            style("✓").green(),
            style(&article).cyan(),
            client.base_url()
        );
        println!("  Materials:  {} line(s)", materials);
        println!("  Operations: {} line(s)", operations);
        let results = session.scenario.results();
        println!(
            "  Total cost: {}",
            style(format_money(results.total_cost, session.currency())).yellow()
        );
    }
    Ok(())
}
