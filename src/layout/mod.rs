pub mod pdfium;

use std::path::Path;

use crate::error::Result;

pub use pdfium::PdfiumLayout;

/// One styled text span as laid out on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font_size: f32,
    /// 1-based page number.
    pub page: u32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, font_size: f32, page: u32) -> Self {
        TextRun {
            text: text.into(),
            font_size,
            page,
        }
    }
}

/// Turns a document on disk into its ordered run stream.
pub trait LayoutSource: Send + Sync {
    fn text_runs(&self, path: &Path) -> Result<Vec<TextRun>>;
}
