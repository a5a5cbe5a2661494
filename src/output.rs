//! The per-collection digest as written to disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::{CollectionInput, CollectionResult};
use crate::query::Persona;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub input_documents: Vec<String>,
    pub persona: Persona,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub page_number: u32,
    pub section_title: String,
    pub importance_rank: f64,
    pub content: String,
    pub all_page_numbers: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub section_title: String,
    pub refined_text: String,
    pub page_number: u32,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionOutput {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl CollectionOutput {
    pub fn new(input: &CollectionInput, result: CollectionResult) -> Self {
        CollectionOutput {
            metadata: Metadata {
                input_documents: input.pdf_files.clone(),
                persona: input.persona.clone(),
                job_to_be_done: input.job_to_be_done.clone(),
                processing_timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            },
            extracted_sections: result
                .sections
                .into_iter()
                .map(|s| ExtractedSection {
                    page_number: s.first_page(),
                    importance_rank: s.rank,
                    document: s.section.document,
                    section_title: s.section.title,
                    content: s.section.body,
                    all_page_numbers: s.section.pages,
                })
                .collect(),
            subsection_analysis: result
                .passages
                .into_iter()
                .map(|p| SubsectionAnalysis {
                    document: p.document,
                    section_title: p.section_title,
                    refined_text: p.text,
                    page_number: p.page,
                    relevance_score: p.relevance,
                })
                .collect(),
        }
    }
}

pub fn output_path(output_dir: &Path, collection_name: &str) -> PathBuf {
    output_dir.join(format!("{}_output.json", collection_name))
}

/// Write pretty JSON beside the target and rename it into place.
/// On failure the temporary file is removed and no output is left behind.
pub fn write_output(output_dir: &Path, collection_name: &str, output: &CollectionOutput) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_path(output_dir, collection_name);
    let tmp = path.with_extension("json.tmp");

    let json = serde_json::to_string_pretty(output)?;
    if let Err(e) = write_synced(&tmp, json.as_bytes()).and_then(|_| fs::rename(&tmp, &path)) {
        if tmp.is_file() {
            let _ = fs::remove_file(&tmp);
        }
        return Err(e.into());
    }
    Ok(path)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
