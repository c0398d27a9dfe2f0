//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;

/// Full-text search for CMS content
#[derive(Parser, Debug)]
#[command(name = "cms-search")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable JSON output for machine consumption
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ./search.toml over ~/.config/cms-search/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search theme content
    Search(commands::search::SearchArgs),

    /// Materialize theme content into its search store
    Index(commands::index::IndexArgs),

    /// Remove a content type from the search index
    Flush(commands::flush::FlushArgs),

    /// Create an index on the search engine
    CreateIndex(commands::engine_index::CreateIndexArgs),

    /// Delete an index from the search engine
    DeleteIndex(commands::engine_index::DeleteIndexArgs),

    /// Show how a query is tokenized
    Tokenize(commands::tokenize::TokenizeArgs),
}
