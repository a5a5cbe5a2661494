use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    Hashing,
    Http,
}

/// Runtime settings: built-in defaults overlaid with `DIGEST_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub embedder: EmbedderKind,
    pub embedding_url: Option<String>,
    pub embedding_model: String,
    pub embedding_api_key: Option<String>,
    pub embedding_dimensions: usize,
    pub embedding_timeout_secs: u64,
    pub embedding_max_retries: usize,
    /// 0 = one worker per document.
    pub workers: usize,
    /// 0 = unbounded.
    pub document_budget_secs: u64,
    pub pdfium_lib_dir: Option<PathBuf>,
    pub min_header_font_size: f32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(Environment::with_prefix("DIGEST").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("input_dir", "input")?
            .set_default("output_dir", "output")?
            .set_default("embedder", "hashing")?
            .set_default("embedding_model", "all-MiniLM-L6-v2")?
            .set_default("embedding_dimensions", 384)?
            .set_default("embedding_timeout_secs", 30)?
            .set_default("embedding_max_retries", 3)?
            .set_default("workers", 0)?
            .set_default("document_budget_secs", 60)?
            .set_default("min_header_font_size", 10.0)?)
    }

    pub fn document_budget(&self) -> Option<Duration> {
        (self.document_budget_secs > 0).then(|| Duration::from_secs(self.document_budget_secs))
    }
}
