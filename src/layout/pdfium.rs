//! Run extraction through the pdfium shared library.
//!
//! Every text object on a page becomes one [`TextRun`], in content-stream order, carrying
//! its scaled font size. Text objects are the closest pdfium analogue of a styled span.
//! Form XObjects are opened and their children walked in place.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::{LayoutSource, TextRun};
use crate::error::{AnalyzerError, Result};

const SEARCH_DIRS: &[&str] = &[
    "./libs/pdfium/lib",
    "./lib",
    ".",
    "/usr/local/lib",
    "/usr/lib",
    "/opt/homebrew/lib",
];

pub struct PdfiumLayout {
    configured_dir: Option<PathBuf>,
    resolved_dir: OnceLock<Option<String>>,
}

impl PdfiumLayout {
    pub fn new(configured_dir: Option<PathBuf>) -> Self {
        PdfiumLayout {
            configured_dir,
            resolved_dir: OnceLock::new(),
        }
    }

    /// Directory holding the platform pdfium library, searched once and cached.
    fn library_dir(&self) -> Option<&str> {
        self.resolved_dir
            .get_or_init(|| {
                let configured = self
                    .configured_dir
                    .iter()
                    .map(|d| d.to_string_lossy().into_owned());
                let defaults = SEARCH_DIRS.iter().map(|d| d.to_string());
                let found = configured.chain(defaults).find(|dir| {
                    let lib = Pdfium::pdfium_platform_library_name_at_path(dir.as_str());
                    Path::new(&lib).exists()
                });
                match &found {
                    Some(dir) => debug!(dir = %dir, "found pdfium library"),
                    None => warn!("pdfium library not found in search path, trying system library"),
                }
                found
            })
            .as_deref()
    }

    /// Bind a fresh pdfium instance; each document task owns its own.
    fn bind(&self, path: &Path) -> Result<Pdfium> {
        if let Some(dir) = self.library_dir() {
            match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)) {
                Ok(bindings) => return Ok(Pdfium::new(bindings)),
                Err(e) => warn!(dir = %dir, error = ?e, "failed to bind pdfium"),
            }
        }
        Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| AnalyzerError::DocumentParse {
                path: path.to_path_buf(),
                reason: format!("pdfium library unavailable: {:?}", e),
            })
    }
}

impl LayoutSource for PdfiumLayout {
    fn text_runs(&self, path: &Path) -> Result<Vec<TextRun>> {
        if !path.exists() {
            return Err(AnalyzerError::MissingInput(path.to_path_buf()));
        }

        let pdfium = self.bind(path)?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| classify_load_error(path, e))?;

        let mut runs = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let page_number = index as u32 + 1;
            for object in page.objects().iter() {
                collect_runs(&object, page_number, &mut runs);
            }
        }

        debug!(path = %path.display(), runs = runs.len(), "extracted text runs");
        Ok(runs)
    }
}

/// A page object as seen by the run walk: either a text span or a container of objects.
trait PageContent {
    fn text_run(&self) -> Option<(String, f32)>;

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn PageContent));
}

impl PageContent for PdfPageObject<'_> {
    fn text_run(&self) -> Option<(String, f32)> {
        self.as_text_object()
            .map(|text| (text.text(), text.scaled_font_size().value))
    }

    fn for_each_child(&self, visit: &mut dyn FnMut(&dyn PageContent)) {
        let Some(form) = self.as_x_object_form_object() else {
            return;
        };
        for index in 0..form.len() {
            match form.get(index) {
                Ok(child) => visit(&child),
                Err(e) => debug!(index, error = ?e, "skipping unreadable form child"),
            }
        }
    }
}

fn collect_runs(object: &dyn PageContent, page: u32, runs: &mut Vec<TextRun>) {
    if let Some((text, font_size)) = object.text_run() {
        runs.push(TextRun::new(text.trim(), font_size, page));
        return;
    }
    object.for_each_child(&mut |child| collect_runs(child, page, runs));
}

fn classify_load_error(path: &Path, e: PdfiumError) -> AnalyzerError {
    let msg = format!("{:?}", e);
    let reason = if msg.contains("Password") || msg.contains("password") {
        "document is password-protected".to_string()
    } else if msg.contains("Format") || msg.contains("format") {
        "document is corrupt or not a PDF".to_string()
    } else {
        format!("failed to load document: {}", msg)
    };
    AnalyzerError::DocumentParse {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    enum Node {
        Text(&'static str, f32),
        Form(Vec<Node>),
        Image,
    }

    impl PageContent for Node {
        fn text_run(&self) -> Option<(String, f32)> {
            match self {
                Node::Text(text, size) => Some((text.to_string(), *size)),
                _ => None,
            }
        }

        fn for_each_child(&self, visit: &mut dyn FnMut(&dyn PageContent)) {
            if let Node::Form(children) = self {
                for child in children {
                    visit(child);
                }
            }
        }
    }

    #[test]
    fn nested_form_text_kept_in_content_order() {
        let page = vec![
            Node::Text(" 1. OVERVIEW ", 14.0),
            Node::Form(vec![
                Node::Text("Inside the form.", 9.0),
                Node::Image,
                Node::Form(vec![Node::Text("2. DEEPER", 12.0)]),
            ]),
            Node::Image,
            Node::Text("After the form.", 9.0),
        ];
        let mut runs = Vec::new();
        for object in &page {
            collect_runs(object, 3, &mut runs);
        }
        assert_eq!(
            runs,
            vec![
                TextRun::new("1. OVERVIEW", 14.0, 3),
                TextRun::new("Inside the form.", 9.0, 3),
                TextRun::new("2. DEEPER", 12.0, 3),
                TextRun::new("After the form.", 9.0, 3),
            ]
        );
    }

    #[test]
    fn missing_file_is_missing_input() {
        let layout = PdfiumLayout::new(None);
        let err = layout
            .text_runs(Path::new("/nonexistent/path/to/file.pdf"))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::MissingInput(_)));
    }

    #[test]
    fn garbage_file_is_parse_failure() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not a pdf").unwrap();
        let layout = PdfiumLayout::new(None);
        let err = layout.text_runs(file.path()).unwrap_err();
        assert!(matches!(err, AnalyzerError::DocumentParse { .. }));
    }
}
