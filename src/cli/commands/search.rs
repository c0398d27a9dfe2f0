//! cms-search search - Search theme content

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::core::SearchableRecord;
use crate::error::Result;
use crate::models::SearchableModel;
use crate::search::to_wildcard_query;

use super::ContentTarget;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    #[command(flatten)]
    pub target: ContentTarget,

    /// Order results by relevance
    #[arg(long)]
    pub ranked: bool,

    /// Show only the most relevant result
    #[arg(long, conflicts_with = "ranked")]
    pub first: bool,

    /// Drop stop words and stem the query before searching
    #[arg(long)]
    pub fuzzy: bool,

    /// Maximum number of results
    #[arg(long, short, default_value = "20")]
    pub limit: usize,

    /// Search driver (default: search.driver from config)
    #[arg(long)]
    pub driver: Option<String>,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let query = if args.fuzzy {
        match ctx.search.search_terms(&args.query) {
            Some(terms) => to_wildcard_query(&terms),
            None => return display_no_query(ctx, args),
        }
    } else {
        args.query.clone()
    };

    let model = args.target.model(ctx);
    let search = ctx.search.search_with(&model, &query, args.driver.as_deref())?;

    let results: Vec<SearchableRecord> = if args.first {
        search.first_ranked(None)?.into_iter().collect()
    } else if args.ranked {
        let mut ranked = search.get_ranked(None)?;
        ranked.truncate(args.limit);
        ranked
    } else {
        search.take(args.limit).get()?
    };

    let index = model.searchable_as(ctx.search.config());
    let driver = args
        .driver
        .clone()
        .unwrap_or_else(|| ctx.search.engines().default_driver().to_string());
    display_results(ctx, args, &query, &index, &driver, &model, &results);
    Ok(())
}

fn display_no_query(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    if ctx.robot_mode {
        println!(
            "{}",
            serde_json::json!({
                "status": "no_query",
                "query": args.query,
                "count": 0,
                "results": [],
            })
        );
    } else {
        println!(
            "{} Nothing left to search for in '{}'",
            "!".yellow(),
            args.query.cyan()
        );
    }
    Ok(())
}

fn display_results(
    ctx: &AppContext,
    args: &SearchArgs,
    query: &str,
    index: &str,
    driver: &str,
    model: &dyn SearchableModel,
    results: &[SearchableRecord],
) {
    if ctx.robot_mode {
        let output: Vec<serde_json::Value> = results
            .iter()
            .map(|record| {
                serde_json::json!({
                    "key": record.key().to_string(),
                    "fileName": record.text("fileName"),
                    "title": record.text("title"),
                    "relevance": record.relevance(),
                    "searchable": model.to_searchable_array(record),
                })
            })
            .collect();

        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "query": args.query,
                "processed_query": query,
                "index": index,
                "driver": driver,
                "count": results.len(),
                "results": output,
            })
        );
        return;
    }

    if results.is_empty() {
        println!(
            "{} No {} found for '{}'",
            "!".yellow(),
            args.target.content_type,
            args.query.cyan()
        );
        return;
    }

    println!(
        "{} results for '{}' ({} on {}):",
        results.len().to_string().bold(),
        args.query.cyan(),
        index,
        driver
    );
    println!();

    for (i, record) in results.iter().enumerate() {
        let rank = format!("{}.", i + 1);
        let title = record.text("title");
        let title = if title.is_empty() { record.text("fileName") } else { title };
        match record.relevance() {
            Some(relevance) => println!(
                "{:4} {} {}",
                rank.dimmed(),
                title.bold(),
                format!("(relevance: {relevance})").dimmed()
            ),
            None => println!("{:4} {}", rank.dimmed(), title.bold()),
        }
        println!("     {}", record.text("fileName").dimmed());
    }
}
