use crate::error::CatalogError;
use crate::llm::Completion;
use crate::metadata::Metadata;
use crate::templates::{ANALYZER_PROMPT, PROMPT_PLACEHOLDER};
use eyre::{Context, Result};
use std::fs;
use std::path::Path;

const OUTPUT_OPEN: &str = "<output>";
const OUTPUT_CLOSE: &str = "</output>";

/// Turns prompt text into a validated metadata record.
pub trait MetadataGenerator {
    fn generate(&self, prompt: &str) -> Result<Metadata>;
}

/// Generator that fills the analyzer prompt and asks a completion backend.
pub struct AnalyzerGenerator<C: Completion> {
    completion: C,
    analyzer_prompt: String,
}

impl<C: Completion> AnalyzerGenerator<C> {
    pub fn new(completion: C, analyzer_prompt: impl Into<String>) -> Self {
        Self {
            completion,
            analyzer_prompt: analyzer_prompt.into(),
        }
    }

    /// Use the analyzer prompt at `path`, or the built-in one if it is absent.
    pub fn from_file(completion: C, path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No analyzer prompt at {}, using built-in", path.display());
            return Ok(Self::new(completion, ANALYZER_PROMPT));
        }
        log::info!("Loading analyzer prompt from {}", path.display());
        let content =
            fs::read_to_string(path).context(format!("Failed to read analyzer prompt {}", path.display()))?;
        log::info!("Analyzer prompt loaded, length: {} characters", content.len());
        Ok(Self::new(completion, content))
    }
}

impl<C: Completion> MetadataGenerator for AnalyzerGenerator<C> {
    fn generate(&self, prompt: &str) -> Result<Metadata> {
        log::info!("Starting metadata generation");
        let request = self.analyzer_prompt.replace(PROMPT_PLACEHOLDER, prompt);
        let response = self.completion.complete(&request)?;
        log::debug!("Extracted content: {}...", preview(&response));

        let metadata = parse_response(&response)?;
        log::info!("Metadata generation completed successfully");
        Ok(metadata)
    }
}

/// The text between the first `<output>` and the following `</output>`.
pub fn extract_output(response: &str) -> Result<&str, CatalogError> {
    let start = response
        .find(OUTPUT_OPEN)
        .ok_or_else(|| CatalogError::generation("could not find <output> section in AI response"))?;
    let body = &response[start + OUTPUT_OPEN.len()..];
    let end = body
        .find(OUTPUT_CLOSE)
        .ok_or_else(|| CatalogError::generation("unterminated <output> section in AI response"))?;
    Ok(body[..end].trim())
}

/// Parse a raw completion into a validated record. Never yields a partially
/// populated one.
pub fn parse_response(response: &str) -> Result<Metadata, CatalogError> {
    let payload = extract_output(response)?;
    log::debug!("Extracted YAML content: {}...", preview(payload));

    let mut metadata: Metadata = serde_yaml::from_str(payload)
        .map_err(|e| CatalogError::generation(format!("invalid YAML in <output> section: {}", e)))?;
    metadata.content_hash = None;
    metadata.validate()?;
    Ok(metadata)
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
