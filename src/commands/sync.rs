use crate::cli::{Cli, SyncArgs};
use crate::config::Config;
use crate::context::RunContext;
use crate::generator::AnalyzerGenerator;
use crate::llm::AnthropicClient;
use crate::relocate::Relocation;
use crate::sync::{EntryOutcome, Staleness, SyncReport, Synchronizer};
use colored::*;
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub fn run(cli: &Cli, args: &SyncArgs) -> Result<()> {
    let work_dir = Path::new(".");

    let config = Config::load(work_dir, cli.config.as_ref())?;
    let ctx = RunContext::from_env(work_dir, config, args.force);

    // Fail before touching any entry
    let api_key = ctx.require_api_key()?;
    let client = AnthropicClient::new(api_key, &ctx.config.llm)?;
    let generator = AnalyzerGenerator::from_file(client, &ctx.config.analyzer_prompt_path(work_dir))?;

    let synchronizer = Synchronizer::new(&ctx, &generator);
    let total = synchronizer.entries().len();
    if total == 0 {
        println!(
            "{} No prompts found under {}",
            "⚠".yellow(),
            ctx.config.paths.prompts.display().to_string().cyan()
        );
        return Ok(());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let result = synchronizer.run(|outcome| {
        pb.println(describe(outcome));
        pb.inc(1);
    });

    match result {
        Ok(report) => {
            pb.finish_and_clear();
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e).context("Metadata sync aborted")
        }
    }
}

fn describe(outcome: &EntryOutcome) -> String {
    let mut line = match outcome.staleness {
        Staleness::Current => format!("{} {} {}", "·".dimmed(), outcome.name, "up to date".dimmed()),
        Staleness::Stale(reason) => format!(
            "{} {} {}",
            "✓".green(),
            outcome.name,
            format!("generated ({})", reason).dimmed()
        ),
    };
    match &outcome.relocation {
        Some(Relocation::Renamed { to }) => {
            line.push_str(&format!(" {} {}", "→".cyan(), to.display()));
        }
        Some(Relocation::Merged { to, overwritten }) => {
            line.push_str(&format!(
                " {} {} {}",
                "⚠".yellow(),
                to.display(),
                format!("merged, {} file(s) overwritten", overwritten.len()).yellow()
            ));
        }
        None => {}
    }
    line
}

fn print_summary(report: &SyncReport) {
    println!();
    println!("{}", "Metadata sync complete".green().bold());
    println!("  {} {}", "Generated:".bold(), report.generated);
    println!("  {} {}", "Up to date:".bold(), report.current);
    println!("  {} {}", "Relocated:".bold(), report.relocated);
    if report.merged > 0 {
        println!("  {} {}", "Merged:".bold(), report.merged.to_string().yellow());
    }
    if !report.skipped.is_empty() {
        println!("  {} {}", "Skipped:".bold(), report.skipped.len().to_string().yellow());
        for name in &report.skipped {
            println!("    {} {} {}", "⚠".yellow(), name, "(moved along with its parent entry)".dimmed());
        }
    }
    println!();
}
