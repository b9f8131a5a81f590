use crate::cli::{Cli, StatusArgs};
use crate::config::Config;
use crate::context::RunContext;
use crate::sync::{self, Staleness};
use colored::*;
use eyre::Result;
use std::path::Path;

pub fn run(cli: &Cli, args: &StatusArgs) -> Result<()> {
    let work_dir = Path::new(".");

    let config = Config::load(work_dir, cli.config.as_ref())?;
    let ctx = RunContext::from_env(work_dir, config, args.force);

    println!();
    println!("{}", "╔════════════════════════════════════════╗".cyan());
    println!("{}", "║         Prompt Catalog Status          ║".cyan());
    println!("{}", "╚════════════════════════════════════════╝".cyan());
    println!();

    println!("{}", "Configuration:".bold());
    println!("  Prompts: {}", ctx.config.paths.prompts.display().to_string().cyan());
    println!("  Model: {}", ctx.config.llm.model.cyan());
    let key_state = if ctx.has_api_key() {
        "set".green()
    } else {
        "missing".red()
    };
    println!("  {}: {}", ctx.config.llm.api_key_env, key_state);
    if ctx.force {
        println!("  Force: {}", "on".yellow());
    }
    println!();

    let entries = sync::entries(&ctx);

    if entries.is_empty() {
        println!("{}", "Entries:".bold());
        println!("  {} No prompts yet. Add one and run {}.", "·".dimmed(), "promptcat sync".cyan());
        println!();
        return Ok(());
    }

    let mut stale = 0;
    println!("{}", "Entries:".bold());
    for entry in &entries {
        match sync::classify_entry(&ctx, entry)? {
            Staleness::Current => println!("  {} {}", "✓".green(), entry.name()),
            Staleness::Stale(reason) => {
                stale += 1;
                println!("  {} {} {}", "⚠".yellow(), entry.name(), format!("({})", reason).dimmed())
            }
        }
    }
    println!();
    println!(
        "  {} current, {} stale",
        (entries.len() - stale).to_string().green(),
        stale.to_string().yellow().bold()
    );
    println!();

    Ok(())
}
