use crate::cli::Cli;
use crate::config::Config;
use crate::render;
use crate::templates::ANALYZER_PROMPT;
use colored::*;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn run(cli: &Cli) -> Result<()> {
    let work_dir = Path::new(".");

    init(work_dir, cli.config.as_ref())
}

pub fn init(work_dir: &Path, config_path: Option<&PathBuf>) -> Result<()> {
    let local_config = Config::local_config_path(work_dir);

    // 1. Config: reuse an existing one, otherwise write the resolved config locally
    let config = if local_config.exists() {
        println!("{} {} already exists, keeping it", "·".dimmed(), ".promptcat/promptcat.yml".cyan());
        Config::load(work_dir, Some(&local_config))?
    } else {
        let config = Config::load(work_dir, config_path)?;
        config.save(&local_config)?;
        println!("{} Created {}", "✓".green(), ".promptcat/promptcat.yml".cyan());
        config
    };

    // 2. Prompts root
    let prompts_dir = config.prompts_dir(work_dir);
    if !prompts_dir.exists() {
        fs::create_dir_all(&prompts_dir).context("Failed to create prompts directory")?;
        println!("{} Created {}", "✓".green(), config.paths.prompts.display().to_string().cyan());
    }

    // 3. View and README templates
    let templates_dir = config.templates_dir(work_dir);
    for name in render::write_default_templates(&templates_dir)? {
        println!(
            "{} Created {}",
            "✓".green(),
            config.paths.templates.join(name).display().to_string().cyan()
        );
    }

    // 4. Analyzer prompt
    let analyzer_path = config.analyzer_prompt_path(work_dir);
    if !analyzer_path.exists() {
        if let Some(parent) = analyzer_path.parent() {
            fs::create_dir_all(parent).context("Failed to create analyzer prompt directory")?;
        }
        fs::write(&analyzer_path, ANALYZER_PROMPT).context("Failed to write analyzer prompt")?;
        println!(
            "{} Created {}",
            "✓".green(),
            config.paths.analyzer_prompt.display().to_string().cyan()
        );
    }

    println!();
    println!("{}", "Prompt catalog initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Drop prompts into {} (one directory per prompt, file {})",
        config.paths.prompts.display().to_string().cyan(),
        config.files.prompt.cyan()
    );
    println!("  2. Export {} and run {}", config.llm.api_key_env.cyan(), "promptcat sync".cyan());
    println!("  3. Run {} to render views and the README", "promptcat views".cyan());

    Ok(())
}
