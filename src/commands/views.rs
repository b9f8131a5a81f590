use crate::cli::Cli;
use crate::config::Config;
use crate::context::RunContext;
use crate::render::HandlebarsEngine;
use crate::views::ViewRenderer;
use colored::*;
use eyre::{Context, Result};
use std::path::Path;

pub fn run(cli: &Cli) -> Result<()> {
    let work_dir = Path::new(".");

    let config = Config::load(work_dir, cli.config.as_ref())?;
    let ctx = RunContext::from_env(work_dir, config, false);
    let engine = HandlebarsEngine::from_dir(&ctx.config.templates_dir(work_dir))?;

    let report = ViewRenderer::new(&ctx, &engine)
        .run()
        .context("Failed to render views")?;

    println!();
    println!("{}", "Views updated".green().bold());
    println!("  {} {}", "Rendered:".bold(), report.rendered);
    if !report.skipped.is_empty() {
        println!("  {} {}", "Skipped:".bold(), report.skipped.len().to_string().yellow());
        for name in &report.skipped {
            println!("    {} {}", "⚠".yellow(), name);
        }
    }
    if !report.categories.is_empty() {
        println!("  {} {}", "Categories:".bold(), report.categories.join(", "));
    }
    println!(
        "  {} {}",
        "Index:".bold(),
        ctx.config.paths.readme.display().to_string().cyan()
    );
    println!();

    Ok(())
}
