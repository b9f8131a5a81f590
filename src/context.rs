use crate::config::Config;
use crate::error::CatalogError;
use eyre::Result;
use std::path::{Path, PathBuf};

/// Everything a run needs from the outside world, resolved once up front.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub work_dir: PathBuf,
    pub config: Config,
    pub force: bool,
    api_key: Option<String>,
}

impl RunContext {
    pub fn new(work_dir: &Path, config: Config, force: bool, api_key: Option<String>) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            config,
            force,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Build a context from the process environment. `force_flag` comes from
    /// the command line and is OR-ed with the configured force variable.
    pub fn from_env(work_dir: &Path, config: Config, force_flag: bool) -> Self {
        let force_env = std::env::var(&config.sync.force_env).ok();
        let force = force_flag || force_env.as_deref().is_some_and(is_truthy);
        if force {
            log::info!("Forcing metadata regeneration for every entry");
        }
        let api_key = std::env::var(&config.llm.api_key_env).ok();
        Self::new(work_dir, config, force, api_key)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The LLM credential; its absence is fatal.
    pub fn require_api_key(&self) -> Result<&str> {
        match &self.api_key {
            Some(key) => {
                log::info!("{} is set.", self.config.llm.api_key_env);
                Ok(key)
            }
            None => {
                log::error!("{} is not set in the environment.", self.config.llm.api_key_env);
                Err(CatalogError::MissingCredential(self.config.llm.api_key_env.clone()).into())
            }
        }
    }

    pub fn prompts_dir(&self) -> PathBuf {
        self.config.prompts_dir(&self.work_dir)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
