//! Bundled example collections for trying the pipeline on your own PDFs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::pipeline::CollectionInput;
use crate::query::Persona;

pub const SAMPLE_KEYS: &[&str] = &["academic_research", "business_analysis", "educational_content"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn sample(key: &str) -> Option<CollectionInput> {
    let input = match key {
        "academic_research" => CollectionInput {
            collection_name: "Academic_Research".into(),
            pdf_files: strings(&["pdf1.pdf", "pdf2.pdf", "pdf3.pdf", "pdf4.pdf"]),
            persona: Persona {
                role: "PhD Researcher in Computational Biology".into(),
                expertise: strings(&["Machine Learning", "Molecular Biology", "Drug Discovery"]),
                focus_areas: strings(&[
                    "Graph Neural Networks",
                    "Protein-Ligand Interactions",
                    "Biomarker Discovery",
                ]),
            },
            job_to_be_done: "Prepare a comprehensive literature review focusing on methodologies, \
                datasets, and performance benchmarks for Graph Neural Networks in Drug Discovery"
                .into(),
        },
        "business_analysis" => CollectionInput {
            collection_name: "Business_Analysis".into(),
            pdf_files: strings(&["report1.pdf", "report2.pdf", "report3.pdf"]),
            persona: Persona {
                role: "Investment Analyst".into(),
                expertise: strings(&["Financial Modeling", "Market Research", "Competitive Analysis"]),
                focus_areas: strings(&[
                    "Technology Sector",
                    "Revenue Forecasting",
                    "Strategic Investments",
                ]),
            },
            job_to_be_done: "Analyze revenue trends, R&D investments, and market positioning \
                strategies across competing tech companies"
                .into(),
        },
        "educational_content" => CollectionInput {
            collection_name: "Educational_Content".into(),
            pdf_files: strings(&[
                "chapter1.pdf",
                "chapter2.pdf",
                "chapter3.pdf",
                "chapter4.pdf",
                "chapter5.pdf",
            ]),
            persona: Persona {
                role: "Undergraduate Chemistry Student".into(),
                expertise: strings(&["General Chemistry", "Basic Organic Chemistry"]),
                focus_areas: strings(&[
                    "Reaction Mechanisms",
                    "Exam Preparation",
                    "Laboratory Techniques",
                ]),
            },
            job_to_be_done: "Identify key concepts and mechanisms for exam preparation on reaction kinetics"
                .into(),
        },
        _ => return None,
    };
    Some(input)
}

/// Write `<key>_input.json` for each requested sample (all when `key` is `None`).
pub fn write_samples(dir: &Path, key: Option<&str>) -> Result<Vec<PathBuf>> {
    let keys: Vec<&str> = match key {
        Some(k) if SAMPLE_KEYS.contains(&k) => vec![k],
        Some(k) => bail!(
            "Collection '{}' not found. Available collections: {}",
            k,
            SAMPLE_KEYS.join(", ")
        ),
        None => SAMPLE_KEYS.to_vec(),
    };

    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for k in keys {
        if let Some(input) = sample(k) {
            let path = dir.join(format!("{}_input.json", k));
            fs::write(&path, serde_json::to_string_pretty(&input)?)?;
            written.push(path);
        }
    }
    Ok(written)
}
