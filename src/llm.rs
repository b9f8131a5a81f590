use crate::config::LlmConfig;
use crate::error::CatalogError;
use eyre::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// A text-completion backend: one user message in, assistant text out.
pub trait Completion {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Anthropic Messages API over a blocking HTTP client.
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl AnthropicClient {
    pub fn new(api_key: &str, config: &LlmConfig) -> Result<Self> {
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        log::info!("Anthropic client initialized");
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            config: config.clone(),
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": &self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": prompt,
                }
            ],
        })
    }
}

impl Completion for AnthropicClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        log::info!("Sending request to Anthropic API (model {})", self.config.model);

        let response = self
            .client
            .post(format!("{}/messages", self.config.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(CatalogError::Api { status, body }.into());
        }

        let data: serde_json::Value = response.json().context("Failed to decode Anthropic API response")?;
        log::info!("Received response from Anthropic API");
        Ok(response_text(&data))
    }
}

/// Concatenate the text blocks of a Messages API response.
fn response_text(data: &serde_json::Value) -> String {
    data["content"]
        .as_array()
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b["type"] == "text")
                .filter_map(|b| b["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}
