pub mod hashing;
pub mod http;

use std::time::Duration;

use crate::error::Result;
use crate::settings::{EmbedderKind, Settings};

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

/// Maps text to a fixed-length vector. Shared read-only across document tasks.
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Short label for logs.
    fn describe(&self) -> String;
}

pub fn from_settings(settings: &Settings) -> Result<Box<dyn Embedder>> {
    match settings.embedder {
        EmbedderKind::Hashing => Ok(Box::new(HashingEmbedder::new(settings.embedding_dimensions))),
        EmbedderKind::Http => {
            let embedder = HttpEmbedder::new(
                settings.embedding_url.clone().unwrap_or_default(),
                settings.embedding_api_key.clone(),
                settings.embedding_model.clone(),
                settings.embedding_dimensions,
                Duration::from_secs(settings.embedding_timeout_secs),
                settings.embedding_max_retries,
            )?;
            Ok(Box::new(embedder))
        }
    }
}
