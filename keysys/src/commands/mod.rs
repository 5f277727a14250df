mod info;
mod list;
mod query;

pub use info::Info;
pub use list::List;
pub use query::Query;

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Query Encrypted Media Extensions key system support.
#[derive(Debug, Clone, Parser)]
#[command(version, author = "clitic <clitic21@gmail.com>", about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON file with extra codecs, containers and key systems.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// When to output colored text.
    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Increase logging verbosity.
    /// This option can be used multiple times.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Info(Info),
    List(List),
    Query(Query),
}
