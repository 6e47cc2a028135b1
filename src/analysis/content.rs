//! Extraction result and options shared by every extractor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Category;
use crate::error::ExtractError;

/// Default excerpt bound in characters
pub const MAX_CHARS_DEFAULT: usize = 1000;

/// Structured metadata attached to an excerpt
pub type Metadata = Map<String, Value>;

/// Options bag handed to an extractor
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Detected category; `None` is treated as unknown
    pub category: Option<Category>,
    /// Upper bound on the excerpt length, in characters
    pub max_chars: usize,
    /// Run OCR on images
    pub enable_ocr: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            category: None,
            max_chars: MAX_CHARS_DEFAULT,
            enable_ocr: true,
        }
    }
}

impl ExtractOptions {
    pub fn for_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn with_ocr(mut self, enable_ocr: bool) -> Self {
        self.enable_ocr = enable_ocr;
        self
    }

    pub fn category(&self) -> Category {
        self.category.unwrap_or(Category::Unknown)
    }
}

/// Bounded excerpt plus metadata produced by one extraction call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub excerpt: String,
    pub metadata: Metadata,
    pub category: Category,
    pub confidence: f32,
    pub method: String,
}

impl ExtractedContent {
    pub fn new(
        excerpt: String,
        metadata: Metadata,
        category: Category,
        confidence: f32,
        method: &str,
    ) -> Self {
        Self {
            excerpt,
            metadata,
            category,
            confidence: confidence.clamp(0.0, 1.0),
            method: method.to_string(),
        }
    }

    /// Placeholder for a failed extraction; the excerpt carries the reason
    pub fn degraded(
        err: &ExtractError,
        label: &str,
        category: Category,
        method: &str,
        max_chars: usize,
    ) -> Self {
        let excerpt = match err {
            ExtractError::Unavailable(_) => format!("{} processing not available", label),
            _ => format!("Error reading {}: {}", label, err),
        };

        let mut metadata = Metadata::new();
        metadata.insert("error".to_string(), Value::String(err.to_string()));

        Self::new(
            truncate_chars(&excerpt, max_chars),
            metadata,
            category,
            err.placeholder_confidence(),
            method,
        )
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn meta_list(&self, key: &str) -> Vec<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Keep at most `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// JSON array of strings for metadata lists
pub fn string_list<I, S>(items: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("anything", 0), "");
    }

    #[test]
    fn test_degraded_confidence_by_kind() {
        let unavailable = ExtractedContent::degraded(
            &ExtractError::Unavailable("pdf backend"),
            "PDF",
            Category::DocumentPdf,
            "pdf_extractor",
            1000,
        );
        assert_eq!(unavailable.confidence, 0.0);
        assert_eq!(unavailable.excerpt, "PDF processing not available");

        let unreadable = ExtractedContent::degraded(
            &ExtractError::Malformed("bad xref".to_string()),
            "PDF",
            Category::DocumentPdf,
            "pdf_extractor",
            1000,
        );
        assert_eq!(unreadable.confidence, 0.1);
        assert_eq!(unreadable.excerpt, "Error reading PDF: bad xref");
        assert_eq!(unreadable.meta_str("error"), Some("bad xref"));
    }

    #[test]
    fn test_degraded_respects_bound() {
        let content = ExtractedContent::degraded(
            &ExtractError::Malformed("x".repeat(200)),
            "PDF",
            Category::DocumentPdf,
            "pdf_extractor",
            20,
        );
        assert_eq!(content.excerpt.chars().count(), 20);
    }
}
