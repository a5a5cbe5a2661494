use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use walkdir::WalkDir;

use crate::output::{write_output, CollectionOutput};
use crate::pipeline::{Analyzer, CollectionInput};

/// Outcome of a batch run.
pub struct BatchStats {
    pub found: usize,
    pub written: usize,
    pub failed: usize,
}

/// Every `*.json` under `input_dir` that is not itself an output, sorted by path.
pub fn discover_inputs(input_dir: &Path) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            name.ends_with(".json") && !name.ends_with("_output.json")
        })
        .collect();
    inputs.sort();
    inputs
}

/// Process one collection file and write its digest. Nothing is written on failure.
pub fn run_collection(analyzer: &Analyzer, input_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let input = CollectionInput::load(input_path)
        .with_context(|| format!("Failed to load {}", input_path.display()))?;
    let base_dir = input_path.parent().unwrap_or_else(|| Path::new("."));

    let result = analyzer
        .process_collection(&input, base_dir)
        .with_context(|| format!("Failed to process collection {}", input.collection_name))?;
    let output = CollectionOutput::new(&input, result);
    let path = write_output(output_dir, &input.collection_name, &output)
        .with_context(|| format!("Failed to write output for {}", input.collection_name))?;
    info!(path = %path.display(), "output written");
    Ok(path)
}

/// Process every collection under `input_dir`; one failing collection never stops the rest.
pub fn run_all(analyzer: &Analyzer, input_dir: &Path, output_dir: &Path) -> Result<BatchStats> {
    let inputs = discover_inputs(input_dir);
    info!(count = inputs.len(), dir = %input_dir.display(), "found input JSON files");

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut stats = BatchStats {
        found: inputs.len(),
        written: 0,
        failed: 0,
    };
    for input_path in &inputs {
        pb.set_message(
            input_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        match run_collection(analyzer, input_path, output_dir) {
            Ok(_) => stats.written += 1,
            Err(e) => {
                error!(input = %input_path.display(), error = %format!("{:#}", e), "collection failed");
                stats.failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(stats)
}
