mod batch;
mod embed;
mod error;
mod layout;
mod output;
mod parser;
mod pipeline;
mod query;
mod ranking;
mod samples;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use pipeline::Analyzer;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "persona_digest",
    about = "Rank PDF sections against a reader persona and their job to be done"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every collection JSON under the input directory
    Run {
        /// Input directory (default: DIGEST_INPUT_DIR or "input")
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output directory (default: DIGEST_OUTPUT_DIR or "output")
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Document workers per collection (0 = one per document)
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Process a single collection JSON
    Collection {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the sections detected in one PDF
    Sections {
        pdf: PathBuf,
        /// Max sections to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Write sample collection inputs
    Init {
        #[arg(short, long, default_value = "input")]
        dir: PathBuf,
        /// One of academic_research, business_analysis, educational_content (default: all)
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load().context("Invalid DIGEST_* configuration")?;

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            workers,
        } => {
            if let Some(dir) = input {
                settings.input_dir = dir;
            }
            if let Some(dir) = output {
                settings.output_dir = dir;
            }
            if let Some(n) = workers {
                settings.workers = n;
            }
            info!(
                input = %settings.input_dir.display(),
                output = %settings.output_dir.display(),
                "starting PDF processing"
            );
            let analyzer = Analyzer::from_settings(&settings)?;
            let stats = batch::run_all(&analyzer, &settings.input_dir, &settings.output_dir)?;
            if stats.found == 0 {
                println!("No collection inputs under {}.", settings.input_dir.display());
                return Ok(());
            }
            println!(
                "Done: {} collections ({} written, {} failed).",
                stats.found, stats.written, stats.failed
            );
            Ok(())
        }
        Commands::Collection { file, output } => {
            let output_dir = output.unwrap_or_else(|| settings.output_dir.clone());
            let analyzer = Analyzer::from_settings(&settings)?;
            let path = batch::run_collection(&analyzer, &file, &output_dir)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Sections { pdf, limit } => {
            let analyzer = Analyzer::from_settings(&settings)?;
            let sections = analyzer.sections(&pdf)?;
            if sections.is_empty() {
                println!("No sections detected (no large upper-case or numbered headings).");
                return Ok(());
            }

            println!("{:>3} | {:<40} | {:<12} | {}", "#", "Title", "Pages", "Body");
            println!("{}", "-".repeat(100));
            for (i, s) in sections.iter().take(limit).enumerate() {
                let pages = page_ranges(&s.pages);
                println!(
                    "{:>3} | {:<40} | {:<12} | {}",
                    i + 1,
                    truncate(&s.title, 40),
                    truncate(&pages, 12),
                    truncate(s.body.trim(), 36)
                );
            }
            println!("\n{} sections", sections.len());
            Ok(())
        }
        Commands::Init { dir, name } => {
            let written = samples::write_samples(&dir, name.as_deref())?;
            for path in &written {
                println!("Created {}", path.display());
            }
            println!("Note: copy the PDFs each collection references into {}.", dir.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// Compact page list for the table: `[3, 4, 5, 9]` -> `"3-5,9"`.
fn page_ranges(pages: &[u32]) -> String {
    let mut sorted = pages.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut spans: Vec<(u32, u32)> = Vec::new();
    for page in sorted {
        match spans.last_mut() {
            Some((_, end)) if *end + 1 == page => *end = page,
            _ => spans.push((page, page)),
        }
    }
    spans
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{}-{}", start, end)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    match (secs / 3600, secs % 3600 / 60, secs % 60) {
        (0, 0, _) => format!("{:.1}s", d.as_secs_f64()),
        (0, m, s) => format!("{}m {}s", m, s),
        (h, m, s) => format!("{}h {}m {}s", h, m, s),
    }
}
