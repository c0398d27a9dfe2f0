//! cms-search index - Materialize theme content into its search store

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;
use crate::models::SearchableModel;
use crate::search::SyncOutcome;

use super::ContentTarget;

#[derive(Args, Debug)]
pub struct IndexArgs {
    #[command(flatten)]
    pub target: ContentTarget,

    /// Rebuild even when the store looks current
    #[arg(long, short)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &IndexArgs) -> Result<()> {
    let model = args.target.model(ctx);
    let index = model.index();
    let rebuilt = args.force || index.needs_update();

    let outcome = if args.force {
        ctx.search.import(&model)?
    } else {
        index.ensure_fresh()?;
        let records = model.all_records(None)?;
        ctx.search.make_searchable(&model, &records)?
    };
    let status = index.status();

    if ctx.robot_mode {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "index": model.searchable_as(ctx.search.config()),
                "rebuilt": rebuilt,
                "store": status.store,
                "rows": status.rows,
                "indexed_at": status.indexed_at,
                "sync": outcome,
            })
        );
        return Ok(());
    }

    let verb = if rebuilt { "Indexed" } else { "Up to date:" };
    println!(
        "{} {} {}",
        "✓".green(),
        verb,
        model.searchable_as(ctx.search.config()).bold()
    );
    match &status.store {
        Some(path) => println!("  store: {}", path.display()),
        None => println!("  store: {}", "in memory".dimmed()),
    }
    if let Some(rows) = status.rows {
        println!("  rows:  {rows}");
    }
    match outcome {
        SyncOutcome::Synced { records } => println!("  synced {records} records"),
        SyncOutcome::Queued {
            records,
            connection,
            queue,
        } => println!(
            "  queued {records} records ({}/{})",
            connection.as_deref().unwrap_or("default"),
            queue.as_deref().unwrap_or("default")
        ),
    }
    Ok(())
}
