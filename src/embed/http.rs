//! Blocking client for OpenAI-compatible `/embeddings` endpoints.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Embedder;
use crate::error::{AnalyzerError, Result};

const MAX_BATCH: usize = 64;

#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
    max_retries: usize,
}

impl HttpEmbedder {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        dimension: usize,
        timeout: Duration,
        max_retries: usize,
    ) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(AnalyzerError::Embedding("missing embedding endpoint URL".into()));
        }
        if model.trim().is_empty() {
            return Err(AnalyzerError::Embedding("missing embedding model name".into()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            let auth = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| AnalyzerError::Embedding("invalid embedding API key".into()))?;
            headers.insert(AUTHORIZATION, auth);
        }
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AnalyzerError::Embedding(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpEmbedder {
            client,
            endpoint: endpoint_for(&base_url),
            model,
            dimension,
            max_retries: max_retries.max(1),
        })
    }

    fn request(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0usize;
        loop {
            let body = EmbeddingRequest {
                model: &self.model,
                input: inputs,
            };
            let (retry, err) = match self.client.post(&self.endpoint).json(&body).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: EmbeddingResponse = resp.json().map_err(|e| {
                            AnalyzerError::Embedding(format!("unreadable embedding response: {}", e))
                        })?;
                        return self.collect(parsed, inputs.len());
                    }
                    let text = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    let err = AnalyzerError::Embedding(format!(
                        "embedding request failed ({}): {}",
                        status, text
                    ));
                    (should_retry(status), err)
                }
                Err(e) => {
                    let retry = e.is_timeout() || e.is_connect() || e.is_request();
                    (retry, AnalyzerError::Embedding(e.to_string()))
                }
            };

            if retry && attempt + 1 < self.max_retries {
                attempt += 1;
                warn!(attempt, error = %err, "retrying embedding request");
                thread::sleep(retry_backoff(attempt));
                continue;
            }
            return Err(err);
        }
    }

    fn collect(&self, mut parsed: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
        if parsed.data.len() != expected {
            return Err(AnalyzerError::Embedding(format!(
                "endpoint returned {} embeddings for {} inputs",
                parsed.data.len(),
                expected
            )));
        }
        parsed.data.sort_by_key(|entry| entry.index);
        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|e| e.embedding).collect();
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(AnalyzerError::Embedding(format!(
                "expected {}-dimensional embeddings, got {}",
                self.dimension,
                bad.len()
            )));
        }
        Ok(vectors)
    }
}

impl Embedder for HttpEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| AnalyzerError::Embedding("empty embedding response".into()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_BATCH) {
            out.extend(self.request(chunk)?);
        }
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("{} via {}", self.model, self.endpoint)
    }
}

fn endpoint_for(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/embeddings") {
        base.to_string()
    } else {
        format!("{}/embeddings", base)
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(500 * (1 << capped))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
