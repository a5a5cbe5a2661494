use crate::layout::TextRun;

use super::HeaderClassifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub document: String,
    pub title: String,
    pub body: String,
    /// Pages in first-seen order; always starts with the title's page.
    pub pages: Vec<u32>,
}

impl Section {
    pub fn first_page(&self) -> u32 {
        self.pages.iter().copied().min().unwrap_or(1)
    }

    /// `"{title}: {body}"` cut to `max_chars` characters.
    pub fn embedding_text(&self, max_chars: usize) -> String {
        format!("{}: {}", self.title, self.body)
            .chars()
            .take(max_chars)
            .collect()
    }
}

struct OpenSection {
    title: String,
    body: String,
    pages: Vec<u32>,
}

impl OpenSection {
    fn finish(self, document: &str) -> Option<Section> {
        if self.title.is_empty() || self.body.is_empty() {
            return None;
        }
        Some(Section {
            document: document.to_string(),
            title: self.title,
            body: self.body,
            pages: self.pages,
        })
    }
}

/// Partition a document's run stream into titled sections.
///
/// Runs before the first header have nowhere to go and are dropped. A header with no
/// body before the next header is dropped as well.
pub fn segment(document: &str, runs: &[TextRun], classifier: &dyn HeaderClassifier) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<OpenSection> = None;

    for run in runs {
        if classifier.is_header(run) {
            if let Some(done) = current.take().and_then(|open| open.finish(document)) {
                sections.push(done);
            }
            current = Some(OpenSection {
                title: run.text.clone(),
                body: String::new(),
                pages: vec![run.page],
            });
            continue;
        }

        if let Some(open) = current.as_mut() {
            open.body.push_str(&run.text);
            open.body.push(' ');
            if !open.pages.contains(&run.page) {
                open.pages.push(run.page);
            }
        }
    }

    if let Some(done) = current.and_then(|open| open.finish(document)) {
        sections.push(done);
    }

    sections
}

// ── Tests ──
