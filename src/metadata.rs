use crate::error::CatalogError;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const HASH_KEY: &str = "content_hash:";

/// Metadata record stored next to each prompt. Field order here is the order
/// written to `metadata.yml`; keys this struct does not know about are kept in
/// `extra` and written after the known ones.
///
/// Every field defaults so hand-edited or partial files still load.
/// `validate` is the strict check applied to generated records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub primary_category: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub one_line_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// A template variable the prompt expects, e.g. `{{TOPIC}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional_for_user: bool,
}

impl Metadata {
    /// Check the fields the synchronizer relies on when placing an entry.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (name, value) in [
            ("title", &self.title),
            ("primary_category", &self.primary_category),
            ("directory", &self.directory),
            ("one_line_description", &self.one_line_description),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::generation(format!("required field '{}' is empty", name)));
            }
        }
        for (name, value) in [("directory", &self.directory), ("primary_category", &self.primary_category)] {
            if !is_path_component(value) {
                return Err(CatalogError::generation(format!(
                    "field '{}' is not a valid directory name: {:?}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Load a metadata file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        let metadata: Self =
            serde_yaml::from_str(&content).context(format!("Failed to parse {}", path.display()))?;
        log::debug!("Read metadata from {}", path.display());
        Ok(metadata)
    }

    /// Write the record, then stamp `hash` into it.
    pub fn save_with_hash(&self, path: &Path, hash: &str) -> Result<()> {
        let mut record = self.clone();
        record.content_hash = None;
        let content = serde_yaml::to_string(&record).context("Failed to serialize metadata")?;
        fs::write(path, content).context(format!("Failed to write {}", path.display()))?;
        write_content_hash(path, hash)
    }
}

fn is_path_component(value: &str) -> bool {
    !value.is_empty() && value == value.trim() && value != "." && value != ".." && !value.contains(['/', '\\'])
}

/// Lowercase hex md5 of the prompt bytes.
pub fn fingerprint(content: &[u8]) -> String {
    format!("{:x}", md5::compute(content))
}

/// The stored `content_hash`, looked up line by line so that an otherwise
/// broken metadata file still yields its hash. Only top-level lines count.
pub fn stored_hash(metadata_text: &str) -> Option<String> {
    metadata_text
        .lines()
        .find(|line| line.starts_with(HASH_KEY))
        .map(|line| {
            line[HASH_KEY.len()..]
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string()
        })
        .filter(|hash| !hash.is_empty())
}

/// Replace the `content_hash` line in place, or append one. A file that does
/// not exist yet is created holding only the hash.
pub fn write_content_hash(path: &Path, hash: &str) -> Result<()> {
    let hash_line = format!("{} {}", HASH_KEY, hash);

    if !path.exists() {
        fs::write(path, format!("{}\n", hash_line)).context(format!("Failed to write {}", path.display()))?;
        log::info!("New metadata file created with content hash: {}", path.display());
        return Ok(());
    }

    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    match lines.iter().position(|line| line.starts_with(HASH_KEY)) {
        Some(index) => lines[index] = hash_line,
        None => lines.push(hash_line),
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    fs::write(path, updated).context(format!("Failed to write {}", path.display()))?;
    log::info!("Content hash updated in {}", path.display());
    Ok(())
}
