pub mod passages;
pub mod sections;

use crate::layout::TextRun;

pub use passages::split_paragraphs;
pub use sections::{segment, Section};

/// Decides whether a run opens a new section.
pub trait HeaderClassifier: Send + Sync {
    fn is_header(&self, run: &TextRun) -> bool;
}

impl<F> HeaderClassifier for F
where
    F: Fn(&TextRun) -> bool + Send + Sync,
{
    fn is_header(&self, run: &TextRun) -> bool {
        self(run)
    }
}

/// Large text that is either shouting or numbered: "2. METHODS", "APPENDIX", "Table 3".
#[derive(Debug, Clone, Copy)]
pub struct FontSizeHeuristic {
    pub min_font_size: f32,
}

impl Default for FontSizeHeuristic {
    fn default() -> Self {
        FontSizeHeuristic { min_font_size: 10.0 }
    }
}

impl HeaderClassifier for FontSizeHeuristic {
    fn is_header(&self, run: &TextRun) -> bool {
        run.font_size > self.min_font_size
            && (is_upper_case(&run.text) || run.text.chars().any(|c| c.is_ascii_digit()))
    }
}

/// At least one cased character and none of them lower-case.
fn is_upper_case(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}
