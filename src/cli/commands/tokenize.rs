//! cms-search tokenize - Show how a query is tokenized

use clap::Args;
use colored::Colorize;

use crate::error::Result;
use crate::search::{split_words, to_wildcard_query, tokenize};

#[derive(Args, Debug)]
pub struct TokenizeArgs {
    /// Query to tokenize
    pub query: String,

    /// Split into words only (no stop words, no stemming)
    #[arg(long)]
    pub simple: bool,
}

/// Runs without an app context; tokenizing needs no config.
pub fn run(robot_mode: bool, args: &TokenizeArgs) -> Result<()> {
    let terms = if args.simple {
        split_words(&args.query)
    } else {
        tokenize(&args.query)
    };

    if robot_mode {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "query": args.query,
                "mode": if args.simple { "simple" } else { "stemmed" },
                "terms": terms,
                "wildcard": to_wildcard_query(&terms),
            })
        );
        return Ok(());
    }

    if terms.is_empty() {
        println!("{} No searchable terms", "!".yellow());
        return Ok(());
    }
    for term in &terms {
        println!("{term}");
    }
    println!("{} {}", "wildcard:".dimmed(), to_wildcard_query(&terms));
    Ok(())
}
