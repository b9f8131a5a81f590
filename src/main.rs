use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;

mod cli;
mod commands;
mod config;
mod context;
mod entry;
mod error;
mod generator;
mod llm;
mod metadata;
mod relocate;
mod render;
mod sync;
mod templates;
mod views;

use cli::{Cli, Commands};

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_filter = if cli.verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(log_file) = &cli.log_file {
        if let Some(parent) = log_file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create log directory")?;
        }
        let target = Box::new(
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .context("Failed to open log file")?,
        );
        builder.target(env_logger::Target::Pipe(target));
    } else {
        builder.target(env_logger::Target::Stderr);
    }

    builder.init();

    if let Some(log_file) = &cli.log_file {
        info!("Logging initialized, writing to: {}", log_file.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    match &cli.command {
        Commands::Init => {
            commands::init::run(&cli).context("Init command failed")?;
        }
        Commands::Sync(args) => {
            commands::sync::run(&cli, args).context("Sync command failed")?;
        }
        Commands::Views => {
            commands::views::run(&cli).context("Views command failed")?;
        }
        Commands::Status(args) => {
            commands::status::run(&cli, args).context("Status command failed")?;
        }
    }

    Ok(())
}
