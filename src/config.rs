use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Locations of the catalog inputs and outputs, relative to the work dir
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub prompts: PathBuf,
    pub templates: PathBuf,
    pub analyzer_prompt: PathBuf,
    pub readme: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            prompts: PathBuf::from("prompts"),
            templates: PathBuf::from(".github/templates"),
            analyzer_prompt: PathBuf::from(".github/prompts/ai_prompt_analyzer_and_output_generator/prompt.md"),
            readme: PathBuf::from("README.md"),
        }
    }
}

/// File names used inside every entry directory
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    pub prompt: String,
    pub metadata: String,
    pub view: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            prompt: "prompt.md".to_string(),
            metadata: "metadata.yml".to_string(),
            view: "view.md".to_string(),
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub api_version: String,
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 2500,
            base_url: "https://api.anthropic.com/v1".to_string(),
            api_version: "2023-06-01".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Synchronizer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    pub force_env: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            force_env: "FORCE_REGENERATE".to_string(),
        }
    }
}

/// View renderer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub default_category: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_category: "uncategorized".to_string(),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub files: FilesConfig,
    pub llm: LlmConfig,
    pub sync: SyncConfig,
    pub render: RenderConfig,
}

impl Config {
    /// Get the global config directory path
    pub fn global_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("promptcat"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|d| d.join("promptcat.yml"))
    }

    /// Get the local config directory path (relative to work_dir)
    pub fn local_config_dir(work_dir: &Path) -> PathBuf {
        work_dir.join(".promptcat")
    }

    /// Get the local config file path (relative to work_dir)
    pub fn local_config_path(work_dir: &Path) -> PathBuf {
        Self::local_config_dir(work_dir).join("promptcat.yml")
    }

    /// Load configuration with the cascade: explicit -> local -> global -> defaults
    pub fn load(work_dir: &Path, config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = Self::local_config_path(work_dir);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(global_config) = Self::global_config_path()
            && global_config.exists()
        {
            match Self::load_from_file(&global_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", global_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(&path, content).context("Failed to write config file")?;
        log::info!("Saved config to: {}", path.as_ref().display());
        Ok(())
    }

    pub fn prompts_dir(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.paths.prompts)
    }

    pub fn templates_dir(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.paths.templates)
    }

    pub fn analyzer_prompt_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.paths.analyzer_prompt)
    }

    pub fn readme_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.paths.readme)
    }
}
