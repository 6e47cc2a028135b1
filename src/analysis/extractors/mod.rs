//! Content extraction
//!
//! Each extractor declares the categories it accepts and turns a file into a
//! bounded excerpt plus metadata. Failures never reach the caller: the
//! fallible [`ContentExtractor::try_extract`] is folded into a low-confidence
//! placeholder by [`ContentExtractor::extract`], and [`CompositeExtractor`]
//! guarantees a result even when every candidate panics.

mod code;
mod docx;
mod fallback;
mod image;
mod pdf;
mod text;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

pub use code::CodeExtractor;
pub use docx::DocxExtractor;
pub use fallback::FallbackExtractor;
pub use image::ImageExtractor;
pub use pdf::PdfExtractor;
pub use text::{TextExtractor, TextFormat};

use super::{Category, ExtractOptions, ExtractedContent};
use crate::error::ExtractError;

/// A strategy producing an excerpt for the categories it accepts
pub trait ContentExtractor: Send + Sync {
    /// Method tag recorded on every result
    fn method(&self) -> &'static str;

    /// Human-readable source name used in placeholder excerpts
    fn label(&self) -> &'static str;

    /// Category reported on a degraded result
    fn category(&self) -> Category;

    fn accepts(&self, category: Category) -> bool;

    fn try_extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError>;

    /// Extract, degrading any failure into a placeholder
    fn extract(&self, path: &Path, options: &ExtractOptions) -> ExtractedContent {
        match self.try_extract(path, options) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("[{}] {}: {}", self.method(), path.display(), err);
                ExtractedContent::degraded(
                    &err,
                    self.label(),
                    self.category(),
                    self.method(),
                    options.max_chars,
                )
            }
        }
    }
}

/// Tries extractors in priority order, then the catch-all
pub struct CompositeExtractor {
    extractors: Vec<Box<dyn ContentExtractor>>,
    fallback: FallbackExtractor,
}

impl CompositeExtractor {
    pub fn new(extractors: Vec<Box<dyn ContentExtractor>>) -> Self {
        Self {
            extractors,
            fallback: FallbackExtractor,
        }
    }

    /// PDF, Word, code, text, image, fallback
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(PdfExtractor),
            Box::new(DocxExtractor),
            Box::new(CodeExtractor),
            Box::new(TextExtractor),
            Box::new(ImageExtractor),
            Box::new(FallbackExtractor),
        ])
    }

    pub fn accepts(&self, category: Category) -> bool {
        self.extractors.iter().any(|e| e.accepts(category))
    }

    pub fn extract(&self, path: &Path, options: &ExtractOptions) -> ExtractedContent {
        let category = options.category();

        for extractor in self.extractors.iter().filter(|e| e.accepts(category)) {
            match panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(path, options))) {
                Ok(content) => {
                    tracing::debug!(
                        "[CompositeExtractor] {} handled {} ({:.2})",
                        extractor.method(),
                        path.display(),
                        content.confidence
                    );
                    return content;
                }
                Err(_) => {
                    tracing::error!(
                        "[CompositeExtractor] {} PANICKED on {}, trying next",
                        extractor.method(),
                        path.display()
                    );
                }
            }
        }

        if !self.accepts(category) {
            tracing::debug!(
                "[CompositeExtractor] {}; using fallback for {}",
                ExtractError::Unsupported(category),
                path.display()
            );
        }
        self.fallback.extract(path, options)
    }
}

impl Default for CompositeExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

/// Trim lines and drop blank ones
pub(crate) fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
