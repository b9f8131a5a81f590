use thiserror::Error;

/// Failure classes that abort a run. Everything else travels as a plain
/// `eyre::Report` with context attached.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} is not set in the environment")]
    MissingCredential(String),

    #[error("metadata generation failed: {0}")]
    Generation(String),

    #[error("LLM API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

impl CatalogError {
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }
}
