//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use clap::Args;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;
use crate::models::VirtualContentModel;

pub mod engine_index;
pub mod flush;
pub mod index;
pub mod search;
pub mod tokenize;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Search(args) => search::run(ctx, args),
        Commands::Index(args) => index::run(ctx, args),
        Commands::Flush(args) => flush::run(ctx, args),
        Commands::CreateIndex(args) => engine_index::run_create(ctx, args),
        Commands::DeleteIndex(args) => engine_index::run_delete(ctx, args),
        Commands::Tokenize(args) => tokenize::run(ctx.robot_mode, args),
    }
}

/// Selects one content type of one theme.
#[derive(Args, Debug, Clone)]
pub struct ContentTarget {
    /// Theme object directory, e.g. pages, partials, content/static
    #[arg(long = "type", short = 't', value_name = "DIR", default_value = "pages")]
    pub content_type: String,

    /// Theme to use (default: theme.active from config)
    #[arg(long)]
    pub theme: Option<String>,

    /// Include files in nested subdirectories
    #[arg(long)]
    pub variants: bool,
}

impl ContentTarget {
    pub fn model(&self, ctx: &AppContext) -> VirtualContentModel {
        ctx.content_model(&self.content_type, self.theme.as_deref(), self.variants)
    }
}
