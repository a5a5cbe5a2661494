use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::subsections::{analyze_subsections, Passage};
use super::{Analyzer, DocumentRef, ScoredSection};
use crate::error::{AnalyzerError, Result};
use crate::query::{Persona, Query};

/// Sections kept in the digest.
pub const TOP_SECTIONS: usize = 10;
/// Leading sections mined for passages.
pub const PASSAGE_SOURCE_SECTIONS: usize = 5;

fn unknown_collection() -> String {
    "Unknown".to_string()
}

/// One collection input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInput {
    #[serde(default = "unknown_collection")]
    pub collection_name: String,
    #[serde(default)]
    pub pdf_files: Vec<String>,
    pub persona: Persona,
    #[serde(default)]
    pub job_to_be_done: String,
}

impl CollectionInput {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| AnalyzerError::InvalidCollection {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Documents that exist under `base_dir`, keeping their `pdf_files` position.
    pub fn resolve_documents(&self, base_dir: &Path) -> Vec<DocumentRef> {
        self.pdf_files
            .iter()
            .enumerate()
            .filter_map(|(index, file)| {
                let path: PathBuf = base_dir.join(file);
                if path.is_file() {
                    Some(DocumentRef::new(index, path))
                } else {
                    warn!(path = %path.display(), "PDF file not found, skipping");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    /// Best first, at most [`TOP_SECTIONS`].
    pub sections: Vec<ScoredSection>,
    /// Best first, at most [`super::subsections::TOP_PASSAGES`].
    pub passages: Vec<Passage>,
}

impl Analyzer {
    /// Rank a whole collection. Documents resolve relative to `base_dir`.
    pub fn process_collection(&self, input: &CollectionInput, base_dir: &Path) -> Result<CollectionResult> {
        let started = Instant::now();
        info!(
            collection = %input.collection_name,
            pdfs = input.pdf_files.len(),
            role = %input.persona.role,
            job = %input.job_to_be_done,
            "processing collection"
        );

        let query = Query::build(self.embedder(), &input.persona, &input.job_to_be_done)?;
        debug!(query = query.text(), "query embedded");
        let docs = input.resolve_documents(base_dir);

        let mut sections = self.score_documents(&docs, &query)?;
        sections.truncate(TOP_SECTIONS);

        let source_count = sections.len().min(PASSAGE_SOURCE_SECTIONS);
        let passages = analyze_subsections(self.embedder(), &sections[..source_count], &query)?;

        info!(
            collection = %input.collection_name,
            sections = sections.len(),
            passages = passages.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "collection processed"
        );
        Ok(CollectionResult { sections, passages })
    }
}
