//! cms-search flush - Remove a content type from the search index

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;
use crate::models::SearchableModel;

use super::ContentTarget;

#[derive(Args, Debug)]
pub struct FlushArgs {
    #[command(flatten)]
    pub target: ContentTarget,
}

pub fn run(ctx: &AppContext, args: &FlushArgs) -> Result<()> {
    let model = args.target.model(ctx);
    ctx.search.flush(&model)?;
    let index = model.searchable_as(ctx.search.config());

    if ctx.robot_mode {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "index": index,
                "flushed": true,
            })
        );
    } else {
        println!("{} Flushed {}", "✓".green(), index.bold());
    }
    Ok(())
}
