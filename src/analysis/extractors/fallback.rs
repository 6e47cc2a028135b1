use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde_json::Value;

use super::ContentExtractor;
use crate::analysis::{truncate_chars, Category, ExtractOptions, ExtractedContent, Metadata};
use crate::error::ExtractError;

const METHOD: &str = "fallback_extractor";

/// Last resort: file name plus filesystem facts
pub struct FallbackExtractor;

impl FallbackExtractor {
    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// The file name within the bound, but never empty
    fn excerpt(path: &Path, max_chars: usize) -> String {
        truncate_chars(&Self::file_name(path), max_chars.max(1))
    }
}

impl ContentExtractor for FallbackExtractor {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn label(&self) -> &'static str {
        "file"
    }

    fn category(&self) -> Category {
        Category::Unknown
    }

    fn accepts(&self, category: Category) -> bool {
        category == Category::Unknown
    }

    fn try_extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        let meta = fs::metadata(path)?;
        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let mut metadata = Metadata::new();
        metadata.insert("size".into(), Value::from(meta.len()));
        metadata.insert("modified".into(), Value::from(modified));
        metadata.insert("mime_type".into(), Value::String(mime));

        Ok(ExtractedContent::new(
            Self::excerpt(path, options.max_chars),
            metadata,
            options.category(),
            0.3,
            METHOD,
        ))
    }

    /// Never fails outright; a stat error still yields the file name
    fn extract(&self, path: &Path, options: &ExtractOptions) -> ExtractedContent {
        match self.try_extract(path, options) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("[FallbackExtractor] {}: {}", path.display(), err);
                let mut metadata = Metadata::new();
                metadata.insert("error".into(), Value::String(err.to_string()));
                ExtractedContent::new(
                    Self::excerpt(path, options.max_chars),
                    metadata,
                    options.category(),
                    0.1,
                    METHOD,
                )
            }
        }
    }
}
