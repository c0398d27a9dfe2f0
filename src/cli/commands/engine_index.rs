//! cms-search create-index / delete-index - Engine index management

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct CreateIndexArgs {
    /// Index name
    pub name: String,

    /// Primary key field
    #[arg(long, short)]
    pub key: Option<String>,

    /// Search driver (default: search.driver from config)
    #[arg(long)]
    pub driver: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteIndexArgs {
    /// Index name
    pub name: String,

    /// Search driver (default: search.driver from config)
    #[arg(long)]
    pub driver: Option<String>,
}

pub fn run_create(ctx: &AppContext, args: &CreateIndexArgs) -> Result<()> {
    let name = prefixed(ctx, &args.name);
    let engine = ctx.search.engine(args.driver.as_deref())?;
    engine.create_index(&name, args.key.as_deref())?;
    report(ctx, "created", &name, engine.name());
    Ok(())
}

pub fn run_delete(ctx: &AppContext, args: &DeleteIndexArgs) -> Result<()> {
    let name = prefixed(ctx, &args.name);
    let engine = ctx.search.engine(args.driver.as_deref())?;
    engine.delete_index(&name)?;
    report(ctx, "deleted", &name, engine.name());
    Ok(())
}

fn prefixed(ctx: &AppContext, name: &str) -> String {
    format!("{}{name}", ctx.config.search.prefix)
}

fn report(ctx: &AppContext, action: &str, name: &str, driver: &str) {
    if ctx.robot_mode {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "action": action,
                "index": name,
                "driver": driver,
            })
        );
    } else {
        println!("{} Index {} {} ({})", "✓".green(), name.bold(), action, driver);
    }
}
