use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "promptcat",
    about = "Prompt catalog - LLM-generated metadata, category layout and Markdown views",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs go to stderr unless --log-file is given. RUST_LOG overrides the log filter."
)]
pub struct Cli {
    /// Path to config file (overrides default locations)
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold .promptcat/, the prompts root and default templates
    Init,

    /// Generate or refresh metadata for every prompt entry
    Sync(SyncArgs),

    /// Render view pages and the README index
    Views,

    /// Show which entries are stale without calling the LLM
    Status(StatusArgs),
}

#[derive(Parser)]
pub struct SyncArgs {
    /// Regenerate metadata even when the content hash matches
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser)]
pub struct StatusArgs {
    /// Classify as if regeneration were forced
    #[arg(short, long)]
    pub force: bool,
}
