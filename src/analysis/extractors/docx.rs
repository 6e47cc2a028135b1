use std::path::Path;

use super::ContentExtractor;
use crate::analysis::{Category, ExtractOptions, ExtractedContent};
use crate::error::ExtractError;

const METHOD: &str = "docx_extractor";

/// Paragraphs joined into the excerpt
const LEAD_PARAGRAPHS: usize = 5;

/// Heading-styled paragraphs kept in metadata
const MAX_HEADINGS: usize = 3;

/// Word documents via docx-rs (`docx` feature)
pub struct DocxExtractor;

impl ContentExtractor for DocxExtractor {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn label(&self) -> &'static str {
        "DOCX"
    }

    fn category(&self) -> Category {
        Category::DocumentWord
    }

    fn accepts(&self, category: Category) -> bool {
        category == Category::DocumentWord
    }

    #[cfg(feature = "docx")]
    fn try_extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        backend::extract(path, options)
    }

    #[cfg(not(feature = "docx"))]
    fn try_extract(
        &self,
        _path: &Path,
        _options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        Err(ExtractError::Unavailable("docx backend"))
    }
}

#[cfg(feature = "docx")]
mod backend {
    use std::path::Path;

    use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
    use serde_json::Value;

    use super::{LEAD_PARAGRAPHS, MAX_HEADINGS, METHOD};
    use crate::analysis::{
        string_list, truncate_chars, Category, ExtractOptions, ExtractedContent, Metadata,
    };
    use crate::error::ExtractError;

    pub(super) fn extract(
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        let bytes = std::fs::read(path)?;
        let doc = docx_rs::read_docx(&bytes)
            .map_err(|e| ExtractError::Malformed(format!("Failed to parse DOCX: {}", e)))?;

        let mut paragraphs = Vec::new();
        let mut headings = Vec::new();

        for child in &doc.document.children {
            if let DocumentChild::Paragraph(para) = child {
                let text = paragraph_text(para);
                if is_heading(para) {
                    headings.push(text.clone());
                }
                paragraphs.push(text);
            }
        }

        let lead = paragraphs
            .iter()
            .take(LEAD_PARAGRAPHS)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        tracing::debug!(
            "[DocxExtractor] {} paragraphs, {} headings from {}",
            paragraphs.len(),
            headings.len(),
            path.display()
        );

        let mut metadata = Metadata::new();
        metadata.insert(
            "headings".into(),
            string_list(headings.into_iter().take(MAX_HEADINGS)),
        );
        metadata.insert("paragraph_count".into(), Value::from(paragraphs.len()));

        Ok(ExtractedContent::new(
            truncate_chars(&lead, options.max_chars),
            metadata,
            Category::DocumentWord,
            0.9,
            METHOD,
        ))
    }

    fn is_heading(para: &Paragraph) -> bool {
        para.property
            .style
            .as_ref()
            .map(|style| style.val.to_lowercase().starts_with("heading"))
            .unwrap_or(false)
    }

    /// Concatenated run text, including runs inside hyperlinks
    fn paragraph_text(para: &Paragraph) -> String {
        let mut output = String::new();
        for child in &para.children {
            match child {
                ParagraphChild::Run(run) => {
                    for run_child in &run.children {
                        if let RunChild::Text(text) = run_child {
                            output.push_str(&text.text);
                        }
                    }
                }
                ParagraphChild::Hyperlink(link) => {
                    for inner in &link.children {
                        if let ParagraphChild::Run(run) = inner {
                            for run_child in &run.children {
                                if let RunChild::Text(text) = run_child {
                                    output.push_str(&text.text);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        output
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_zip_that_is_not_docx_degrades() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("archive.docx");
        fs::write(&path, b"PK\x03\x04 not a real archive").unwrap();

        let content =
            DocxExtractor.extract(&path, &ExtractOptions::for_category(Category::DocumentWord));
        assert_eq!(content.method, "docx_extractor");
        assert!(content.confidence <= 0.1);
        assert!(content.metadata.contains_key("error"));
    }
}
