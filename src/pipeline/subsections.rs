use std::cmp::Ordering;

use super::ScoredSection;
use crate::embed::Embedder;
use crate::error::{AnalyzerError, Result};
use crate::parser::split_paragraphs;
use crate::query::Query;
use crate::ranking::{by_relevance, relevance};

/// Passages kept across all source sections.
pub const TOP_PASSAGES: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub document: String,
    pub section_title: String,
    pub text: String,
    /// First page of the parent section.
    pub page: u32,
    /// `cos(passage, query)`; higher is more relevant.
    pub relevance: f64,
}

struct Candidate<'a> {
    section: usize,
    paragraph: usize,
    source: &'a ScoredSection,
    text: &'a str,
}

/// Rank the paragraphs of `sections` against the query, best first.
///
/// Paragraph text is embedded whole; only section embeddings are length-capped.
pub fn analyze_subsections(
    embedder: &dyn Embedder,
    sections: &[ScoredSection],
    query: &Query,
) -> Result<Vec<Passage>> {
    let candidates: Vec<Candidate> = sections
        .iter()
        .enumerate()
        .flat_map(|(section, source)| {
            split_paragraphs(&source.section.body)
                .into_iter()
                .enumerate()
                .map(move |(paragraph, text)| Candidate {
                    section,
                    paragraph,
                    source,
                    text,
                })
        })
        .collect();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<&str> = candidates.iter().map(|c| c.text).collect();
    let vectors = embedder.embed_batch(&texts)?;
    if vectors.len() != candidates.len() {
        return Err(AnalyzerError::Embedding(format!(
            "got {} vectors for {} passages",
            vectors.len(),
            candidates.len()
        )));
    }

    let mut scored: Vec<(f64, &Candidate)> = candidates
        .iter()
        .zip(&vectors)
        .map(|(c, v)| (relevance(v, query.vector()), c))
        .collect();
    scored.sort_by(|a, b| compare_candidates(a, b));

    Ok(scored
        .into_iter()
        .take(TOP_PASSAGES)
        .map(|(score, c)| Passage {
            document: c.source.section.document.clone(),
            section_title: c.source.section.title.clone(),
            text: c.text.to_string(),
            page: c.source.first_page(),
            relevance: score,
        })
        .collect())
}

fn compare_candidates(a: &(f64, &Candidate), b: &(f64, &Candidate)) -> Ordering {
    by_relevance(a.0, b.0)
        .then_with(|| a.1.section.cmp(&b.1.section))
        .then_with(|| a.1.paragraph.cmp(&b.1.paragraph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::HashingEmbedder;
    use crate::parser::Section;
    use crate::pipeline::tests::persona;

    fn scored(title: &str, body: &str, pages: Vec<u32>) -> ScoredSection {
        ScoredSection {
            section: Section {
                document: "doc.pdf".into(),
                title: title.into(),
                body: body.into(),
                pages,
            },
            rank: 0.5,
            doc_index: 0,
            ordinal: 0,
        }
    }

    #[test]
    fn only_long_fragment_survives() {
        let short = "a".repeat(30);
        let long = "graph neural networks ".repeat(4);
        assert_eq!(long.chars().count(), 88);
        let body = format!("{}\n\n{}", short, long);
        let embedder = HashingEmbedder::default();
        let query = Query::build(&embedder, &persona(), "review").unwrap();
        let passages =
            analyze_subsections(&embedder, &[scored("1. INTRO", &body, vec![3, 4])], &query).unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, long);
        assert_eq!(passages[0].page, 3);
        assert_eq!(passages[0].section_title, "1. INTRO");
    }

    #[test]
    fn capped_and_sorted_descending() {
        let embedder = HashingEmbedder::default();
        let query = Query::build(&embedder, &persona(), "drug discovery").unwrap();
        let topics = ["drug discovery", "protein folding", "machine learning", "bread", "opera"];
        let sections: Vec<ScoredSection> = (0..5)
            .map(|i| {
                let body = topics
                    .iter()
                    .map(|t| format!("Paragraph {} of section {} covers {} thoroughly.", t, i, t))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                scored(&format!("{}. PART", i), &body, vec![i + 1])
            })
            .collect();
        let passages = analyze_subsections(&embedder, &sections, &query).unwrap();
        assert_eq!(passages.len(), TOP_PASSAGES);
        assert!(passages.windows(2).all(|w| w[0].relevance >= w[1].relevance));
        assert!(passages[0].text.contains("drug discovery"));
    }

    fn candidate(section: usize, paragraph: usize, source: &ScoredSection) -> Candidate<'_> {
        Candidate {
            section,
            paragraph,
            source,
            text: "same text",
        }
    }

    #[test]
    fn equal_relevance_ordered_by_section_then_paragraph() {
        let first = scored("1. FIRST", "x", vec![1]);
        let second = scored("2. SECOND", "x", vec![2]);
        let candidates = [
            candidate(1, 0, &second),
            candidate(0, 1, &first),
            candidate(0, 0, &first),
            candidate(1, 1, &second),
        ];
        let mut scored: Vec<(f64, &Candidate)> = candidates
            .iter()
            .zip([0.5, 0.5, 0.5, 0.9])
            .map(|(c, score)| (score, c))
            .collect();
        scored.sort_by(|a, b| compare_candidates(a, b));
        let order: Vec<(usize, usize)> = scored.iter().map(|(_, c)| (c.section, c.paragraph)).collect();
        assert_eq!(order, vec![(1, 1), (0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn identical_paragraphs_follow_section_order() {
        let text = "Graph neural networks model molecules as graphs of atoms and bonds.";
        let embedder = HashingEmbedder::default();
        let query = Query::build(&embedder, &persona(), "review").unwrap();
        let sections = [
            scored("2. LATER TITLE", text, vec![7]),
            scored("1. EARLIER TITLE", text, vec![2]),
        ];
        let passages = analyze_subsections(&embedder, &sections, &query).unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].relevance, passages[1].relevance);
        assert_eq!(passages[0].section_title, "2. LATER TITLE");
        assert_eq!(passages[1].section_title, "1. EARLIER TITLE");
    }

    #[test]
    fn no_sections_no_passages() {
        let embedder = HashingEmbedder::default();
        let query = Query::build(&embedder, &persona(), "").unwrap();
        assert!(analyze_subsections(&embedder, &[], &query).unwrap().is_empty());
    }
}
