//! PDF extraction
//!
//! First-page text via pdf-extract, document info (title, author, subject)
//! and page count via lopdf. Compiled only with the `pdf` feature; without
//! it the extractor reports the backend as unavailable.

use std::path::Path;

use super::ContentExtractor;
use crate::analysis::{Category, ExtractOptions, ExtractedContent};
use crate::error::ExtractError;

const METHOD: &str = "pdf_extractor";

pub struct PdfExtractor;

impl ContentExtractor for PdfExtractor {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn label(&self) -> &'static str {
        "PDF"
    }

    fn category(&self) -> Category {
        Category::DocumentPdf
    }

    fn accepts(&self, category: Category) -> bool {
        category == Category::DocumentPdf
    }

    #[cfg(feature = "pdf")]
    fn try_extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        backend::extract(path, options)
    }

    #[cfg(not(feature = "pdf"))]
    fn try_extract(
        &self,
        _path: &Path,
        _options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        Err(ExtractError::Unavailable("pdf backend"))
    }
}

#[cfg(feature = "pdf")]
mod backend {
    use std::panic::{self, AssertUnwindSafe};
    use std::path::Path;

    use lopdf::{Dictionary, Document, Object};
    use serde_json::Value;

    use super::METHOD;
    use crate::analysis::extractors::clean_text;
    use crate::analysis::{truncate_chars, Category, ExtractOptions, ExtractedContent, Metadata};
    use crate::error::ExtractError;

    pub(super) fn extract(
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        let bytes = std::fs::read(path)?;
        tracing::debug!("[PdfExtractor] {} bytes from {}", bytes.len(), path.display());

        let doc = Document::load_mem(&bytes)
            .map_err(|e| ExtractError::Malformed(format!("Failed to parse PDF: {}", e)))?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(ExtractError::Malformed("PDF has no pages".to_string()));
        }

        // pdf-extract can panic on malformed fonts/glyphs
        let first_page = match panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })) {
            Ok(Ok(pages)) => pages.into_iter().next().unwrap_or_default(),
            Ok(Err(e)) => {
                return Err(ExtractError::Malformed(format!("PDF extraction failed: {}", e)));
            }
            Err(_panic) => {
                tracing::error!(
                    "[PdfExtractor] PDF extraction PANICKED for {} - likely malformed font/glyph",
                    path.display()
                );
                return Err(ExtractError::Malformed(
                    "PDF extraction panicked - likely contains malformed fonts".to_string(),
                ));
            }
        };

        let info = info_dictionary(&doc);
        let field = |key: &[u8]| {
            info.and_then(|dict| dict.get(key).ok())
                .and_then(decode_text)
                .unwrap_or_default()
        };

        let mut metadata = Metadata::new();
        metadata.insert("title".into(), Value::String(field(b"Title")));
        metadata.insert("author".into(), Value::String(field(b"Author")));
        metadata.insert("subject".into(), Value::String(field(b"Subject")));
        metadata.insert("page_count".into(), Value::from(page_count));

        let text = clean_text(&first_page);
        tracing::info!(
            "[PdfExtractor] {} chars on page 1 of {} from {}",
            text.chars().count(),
            page_count,
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        Ok(ExtractedContent::new(
            truncate_chars(&text, options.max_chars),
            metadata,
            Category::DocumentPdf,
            0.9,
            METHOD,
        ))
    }

    /// The trailer's Info entry, direct or by reference
    fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
        match doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// PDF text strings are UTF-16BE with a BOM or PDFDocEncoding
    fn decode_text(object: &Object) -> Option<String> {
        let Object::String(bytes, _) = object else {
            return None;
        };

        let text = if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
            let units: Vec<u16> = utf16
                .chunks(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]))
                .collect();
            String::from_utf16_lossy(&units)
        } else {
            bytes.iter().map(|&b| b as char).collect()
        };

        Some(text.trim().to_string())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_accepts_only_pdf() {
        assert!(PdfExtractor.accepts(Category::DocumentPdf));
        assert!(!PdfExtractor.accepts(Category::DocumentWord));
    }

    #[test]
    fn test_garbage_pdf_degrades() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"%PDF-1.4\nthis is not really a pdf").unwrap();

        let content = PdfExtractor.extract(&path, &ExtractOptions::for_category(Category::DocumentPdf));
        assert_eq!(content.category, Category::DocumentPdf);
        assert_eq!(content.method, "pdf_extractor");
        assert!(content.confidence == 0.1 || content.confidence == 0.0);
        assert!(!content.excerpt.is_empty());
        assert!(content.metadata.contains_key("error"));
    }
}
