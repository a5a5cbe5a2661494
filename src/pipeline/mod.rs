//! Document-to-ranked-excerpts pipeline.
//!
//! [`Analyzer`] owns the long-lived collaborators (layout extraction, embedder, header
//! classifier) and is passed by reference into every document task. Per collection:
//! query vector → parallel segment+score per document → merged ranking → passages.

pub mod collection;
pub mod subsections;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::embed::{self, Embedder};
use crate::error::{AnalyzerError, Result};
use crate::layout::{LayoutSource, PdfiumLayout};
use crate::parser::{segment, FontSizeHeuristic, HeaderClassifier, Section};
use crate::query::Query;
use crate::ranking::{by_rank, importance_rank};
use crate::settings::Settings;

pub use collection::{CollectionInput, CollectionResult};

/// Characters of `"{title}: {body}"` submitted when embedding a section.
pub const MAX_SECTION_EMBED_CHARS: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSection {
    pub section: Section,
    /// `1 - cos(section, query)`; lower is more important.
    pub rank: f64,
    pub(crate) doc_index: usize,
    pub(crate) ordinal: usize,
}

impl ScoredSection {
    pub fn first_page(&self) -> u32 {
        self.section.first_page()
    }
}

/// A document scheduled for one collection: its position in `pdf_files`, display name, path.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

impl DocumentRef {
    pub fn new(index: usize, path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        DocumentRef { index, name, path }
    }
}

pub struct Analyzer {
    layout: Box<dyn LayoutSource>,
    embedder: Box<dyn Embedder>,
    classifier: Box<dyn HeaderClassifier>,
    workers: usize,
    document_budget: Option<Duration>,
}

impl Analyzer {
    pub fn new(
        layout: Box<dyn LayoutSource>,
        embedder: Box<dyn Embedder>,
        classifier: Box<dyn HeaderClassifier>,
    ) -> Self {
        Analyzer {
            layout,
            embedder,
            classifier,
            workers: 0,
            document_budget: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = embed::from_settings(settings)?;
        info!(embedder = %embedder.describe(), dimension = embedder.dimension(), "embedder ready");
        let analyzer = Analyzer::new(
            Box::new(PdfiumLayout::new(settings.pdfium_lib_dir.clone())),
            embedder,
            Box::new(FontSizeHeuristic {
                min_font_size: settings.min_header_font_size,
            }),
        );
        Ok(analyzer
            .with_workers(settings.workers)
            .with_document_budget(settings.document_budget()))
    }

    /// 0 = one worker per document.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_document_budget(mut self, budget: Option<Duration>) -> Self {
        self.document_budget = budget;
        self
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Segment one document without scoring it.
    pub fn sections(&self, path: &Path) -> Result<Vec<Section>> {
        let doc = DocumentRef::new(0, path.to_path_buf());
        let runs = self.layout.text_runs(&doc.path)?;
        Ok(segment(&doc.name, &runs, self.classifier.as_ref()))
    }

    /// Score every document in parallel and merge into one ranking, best first.
    ///
    /// A document that fails or runs out of budget is logged and contributes nothing.
    pub fn score_documents(&self, docs: &[DocumentRef], query: &Query) -> Result<Vec<ScoredSection>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }
        let threads = if self.workers == 0 { docs.len() } else { self.workers };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("digest-doc-{}", i))
            .build()
            .map_err(|e| AnalyzerError::WorkerPool(e.to_string()))?;

        let per_doc: Vec<Vec<ScoredSection>> = pool.install(|| {
            docs.par_iter()
                .map(|doc| match self.score_document(doc, query) {
                    Ok(scored) => {
                        info!(document = %doc.name, sections = scored.len(), "document scored");
                        scored
                    }
                    Err(e) => {
                        error!(document = %doc.name, error = %e, "document skipped");
                        Vec::new()
                    }
                })
                .collect()
        });

        let mut merged: Vec<ScoredSection> = per_doc.into_iter().flatten().collect();
        merged.sort_by(compare_sections);
        Ok(merged)
    }

    fn score_document(&self, doc: &DocumentRef, query: &Query) -> Result<Vec<ScoredSection>> {
        let started = Instant::now();
        debug!(document = %doc.name, "processing document");

        let runs = self.layout.text_runs(&doc.path)?;
        let sections = segment(&doc.name, &runs, self.classifier.as_ref());
        self.check_budget(doc, started)?;

        let mut scored = Vec::with_capacity(sections.len());
        for (ordinal, section) in sections.into_iter().enumerate() {
            self.check_budget(doc, started)?;
            let vector = self
                .embedder
                .embed(&section.embedding_text(MAX_SECTION_EMBED_CHARS))?;
            scored.push(ScoredSection {
                rank: importance_rank(&vector, query.vector()),
                section,
                doc_index: doc.index,
                ordinal,
            });
        }
        Ok(scored)
    }

    fn check_budget(&self, doc: &DocumentRef, started: Instant) -> Result<()> {
        match self.document_budget {
            Some(budget) if started.elapsed() > budget => Err(AnalyzerError::DocumentTimeout {
                path: doc.path.clone(),
                budget,
            }),
            _ => Ok(()),
        }
    }
}

/// Rank, then document name, then position in `pdf_files`, then section order.
fn compare_sections(a: &ScoredSection, b: &ScoredSection) -> Ordering {
    by_rank(a.rank, b.rank)
        .then_with(|| a.section.document.cmp(&b.section.document))
        .then_with(|| a.doc_index.cmp(&b.doc_index))
        .then_with(|| a.ordinal.cmp(&b.ordinal))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::embed::HashingEmbedder;
    use crate::layout::testing::ScriptedLayout;
    use crate::layout::TextRun;
    use crate::query::Persona;
    use std::thread;

    pub(crate) fn analyzer(layout: ScriptedLayout) -> Analyzer {
        Analyzer::new(
            Box::new(layout),
            Box::new(HashingEmbedder::default()),
            Box::new(FontSizeHeuristic::default()),
        )
    }

    pub(crate) fn persona() -> Persona {
        Persona {
            role: "PhD Researcher in Computational Biology".into(),
            expertise: vec!["Machine Learning".into(), "Drug Discovery".into()],
            focus_areas: vec!["Graph Neural Networks".into()],
        }
    }

    fn doc_runs(topic: &str) -> Vec<TextRun> {
        vec![
            TextRun::new("1. OVERVIEW", 14.0, 1),
            TextRun::new(format!("This chapter is about {}.", topic), 9.0, 1),
            TextRun::new("2. DETAILS", 14.0, 2),
            TextRun::new(format!("Graph neural networks and {} in practice.", topic), 9.0, 2),
        ]
    }

    fn docs(names: &[&str]) -> Vec<DocumentRef> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| DocumentRef::new(i, PathBuf::from(format!("/in/{}", n))))
            .collect()
    }

    #[test]
    fn merged_ranking_is_sorted_and_total() {
        let layout = ScriptedLayout::default()
            .with("gnn.pdf", doc_runs("graph neural networks for drug discovery"))
            .with("cooking.pdf", doc_runs("baking sourdough bread"));
        let a = analyzer(layout);
        let query = Query::build(a.embedder(), &persona(), "review GNN methods").unwrap();
        let ranked = a.score_documents(&docs(&["cooking.pdf", "gnn.pdf"]), &query).unwrap();
        assert_eq!(ranked.len(), 4);
        assert!(ranked.windows(2).all(|w| w[0].rank <= w[1].rank));
        assert_eq!(ranked[0].section.document, "gnn.pdf");
        assert!(ranked.iter().all(|s| (0.0..=2.0).contains(&s.rank)));
    }

    #[test]
    fn ties_break_by_document_name_then_order() {
        let layout = ScriptedLayout::default()
            .with("beta.pdf", doc_runs("drug discovery"))
            .with("alpha.pdf", doc_runs("drug discovery"));
        let a = analyzer(layout);
        let query = Query::build(a.embedder(), &persona(), "").unwrap();
        let ranked = a.score_documents(&docs(&["beta.pdf", "alpha.pdf"]), &query).unwrap();
        let position = |doc: &str, title: &str| {
            ranked
                .iter()
                .position(|s| s.section.document == doc && s.section.title == title)
                .unwrap()
        };
        for title in ["1. OVERVIEW", "2. DETAILS"] {
            let (a_pos, b_pos) = (position("alpha.pdf", title), position("beta.pdf", title));
            assert_eq!(ranked[a_pos].rank, ranked[b_pos].rank);
            assert!(a_pos < b_pos);
        }
    }

    #[test]
    fn repeated_scoring_is_identical() {
        let layout = ScriptedLayout::default()
            .with("a.pdf", doc_runs("protein ligand interactions"))
            .with("b.pdf", doc_runs("biomarker discovery"))
            .with("c.pdf", doc_runs("graph neural networks"));
        let a = analyzer(layout).with_workers(2);
        let query = Query::build(a.embedder(), &persona(), "literature review").unwrap();
        let all = docs(&["a.pdf", "b.pdf", "c.pdf"]);
        let first = a.score_documents(&all, &query).unwrap();
        for _ in 0..5 {
            assert_eq!(a.score_documents(&all, &query).unwrap(), first);
        }
    }

    #[test]
    fn unparseable_document_contributes_nothing() {
        let layout = ScriptedLayout::default().with("good.pdf", doc_runs("kinetics"));
        let a = analyzer(layout);
        let query = Query::build(a.embedder(), &persona(), "").unwrap();
        let ranked = a.score_documents(&docs(&["corrupt.pdf", "good.pdf"]), &query).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|s| s.section.document == "good.pdf"));
    }

    struct SlowLayout(ScriptedLayout);

    impl LayoutSource for SlowLayout {
        fn text_runs(&self, path: &Path) -> Result<Vec<TextRun>> {
            if path.ends_with("slow.pdf") {
                thread::sleep(Duration::from_millis(50));
            }
            self.0.text_runs(path)
        }
    }

    #[test]
    fn over_budget_document_dropped() {
        let scripted = ScriptedLayout::default()
            .with("slow.pdf", doc_runs("anything"))
            .with("fast.pdf", doc_runs("anything else"));
        let a = Analyzer::new(
            Box::new(SlowLayout(scripted)),
            Box::new(HashingEmbedder::default()),
            Box::new(FontSizeHeuristic::default()),
        )
        .with_document_budget(Some(Duration::from_millis(5)));
        let query = Query::build(a.embedder(), &persona(), "").unwrap();
        let ranked = a.score_documents(&docs(&["slow.pdf", "fast.pdf"]), &query).unwrap();
        assert!(ranked.iter().all(|s| s.section.document == "fast.pdf"));
    }

    #[test]
    fn no_documents_no_sections() {
        let a = analyzer(ScriptedLayout::default());
        let query = Query::build(a.embedder(), &persona(), "").unwrap();
        assert!(a.score_documents(&[], &query).unwrap().is_empty());
    }

    #[test]
    fn sections_for_single_document() {
        let a = analyzer(ScriptedLayout::default().with("x.pdf", doc_runs("x")));
        let sections = a.sections(Path::new("/tmp/x.pdf")).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].pages, vec![2]);
    }
}
