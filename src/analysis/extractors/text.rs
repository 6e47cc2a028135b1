use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::ContentExtractor;
use crate::analysis::{string_list, truncate_chars, Category, ExtractOptions, ExtractedContent, Metadata};
use crate::error::ExtractError;

const METHOD: &str = "text_extractor";

const MAX_KEYS: usize = 5;
const MAX_HEADINGS: usize = 3;

static HTML_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h[1-6][^>]*>(.*?)</h[1-6]>").expect("static heading pattern"));

static MARKDOWN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+(.+?)\s*$").expect("static heading pattern"));

/// Sub-format picked by sniffing decoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Json,
    Yaml,
    Markup,
    Config,
    Text,
}

impl TextFormat {
    pub fn sniff(content: &str) -> Self {
        let trimmed = content.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            TextFormat::Json
        } else if trimmed.starts_with("---") || (content.contains(':') && content.contains('\n')) {
            TextFormat::Yaml
        } else if content.contains('<') && content.contains('>') {
            TextFormat::Markup
        } else if content.contains('=') && content.contains('\n') {
            TextFormat::Config
        } else {
            TextFormat::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::Json => "json",
            TextFormat::Yaml => "yaml",
            TextFormat::Markup => "markup",
            TextFormat::Config => "config",
            TextFormat::Text => "text",
        }
    }
}

/// Plain text, markup, config, and structured data
pub struct TextExtractor;

impl TextExtractor {
    /// Top-level keys of a JSON object
    fn json_keys(content: &str) -> Result<Vec<String>, ExtractError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ExtractError::Malformed(e.to_string()))?;
        Ok(value
            .as_object()
            .map(|obj| obj.keys().take(MAX_KEYS).cloned().collect())
            .unwrap_or_default())
    }

    /// Top-level keys of a YAML mapping
    fn yaml_keys(content: &str) -> Result<Vec<String>, ExtractError> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ExtractError::Malformed(e.to_string()))?;
        Ok(value
            .as_mapping()
            .map(|map| {
                map.keys()
                    .filter_map(|key| match key {
                        serde_yaml::Value::String(s) => Some(s.clone()),
                        serde_yaml::Value::Number(n) => Some(n.to_string()),
                        serde_yaml::Value::Bool(b) => Some(b.to_string()),
                        _ => None,
                    })
                    .take(MAX_KEYS)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// HTML `<hN>` headings, or Markdown `#` headings when there are none
    fn headings(content: &str) -> Vec<String> {
        let html: Vec<String> = HTML_HEADING
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
            .take(MAX_HEADINGS)
            .collect();
        if !html.is_empty() {
            return html;
        }

        MARKDOWN_HEADING
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .take(MAX_HEADINGS)
            .collect()
    }

    pub fn metadata_for(content: &str, format: TextFormat) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("subtype".into(), Value::String(format.as_str().to_string()));

        let keys = match format {
            TextFormat::Json => Some(Self::json_keys(content)),
            TextFormat::Yaml => Some(Self::yaml_keys(content)),
            _ => None,
        };

        match keys {
            Some(Ok(keys)) => {
                metadata.insert("keys".into(), string_list(keys));
            }
            Some(Err(e)) => {
                // Keys are optional; a parse failure keeps the excerpt
                tracing::debug!("[TextExtractor] {} keys unavailable: {}", format.as_str(), e);
            }
            None => {}
        }

        if format == TextFormat::Markup || format == TextFormat::Text {
            let headings = Self::headings(content);
            if !headings.is_empty() {
                metadata.insert("headings".into(), string_list(headings));
            }
        }

        metadata
    }
}

impl ContentExtractor for TextExtractor {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn label(&self) -> &'static str {
        "text file"
    }

    fn category(&self) -> Category {
        Category::PlainText
    }

    fn accepts(&self, category: Category) -> bool {
        matches!(
            category,
            Category::PlainText | Category::Markup | Category::Config | Category::StructuredData
        )
    }

    fn try_extract(
        &self,
        path: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractedContent, ExtractError> {
        let content = fs::read_to_string(path)?;
        let format = TextFormat::sniff(&content);
        let metadata = Self::metadata_for(&content, format);

        tracing::debug!(
            "[TextExtractor] {} sniffed as {} ({} chars)",
            path.display(),
            format.as_str(),
            content.chars().count()
        );

        let category = match options.category() {
            c if self.accepts(c) => c,
            _ => Category::PlainText,
        };

        Ok(ExtractedContent::new(
            truncate_chars(&content, options.max_chars),
            metadata,
            category,
            0.8,
            METHOD,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn extract_str(content: &str, suffix: &str, category: Category) -> ExtractedContent {
        let mut file = NamedTempFile::with_suffix(suffix).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        TextExtractor.extract(file.path(), &ExtractOptions::for_category(category))
    }

    #[test]
    fn test_sniff() {
        assert_eq!(TextFormat::sniff("  {\"a\": 1}"), TextFormat::Json);
        assert_eq!(TextFormat::sniff("---\nname: x"), TextFormat::Yaml);
        assert_eq!(TextFormat::sniff("<p>hi</p>"), TextFormat::Markup);
        assert_eq!(TextFormat::sniff("a=1\nb=2"), TextFormat::Config);
        assert_eq!(TextFormat::sniff("just words"), TextFormat::Text);
    }

    #[test]
    fn test_json_keys_in_document_order() {
        let content = extract_str(
            r#"{"zeta": 1, "alpha": 2, "mid": 3, "b": 4, "c": 5, "d": 6}"#,
            ".json",
            Category::StructuredData,
        );
        assert_eq!(content.meta_str("subtype"), Some("json"));
        assert_eq!(content.meta_list("keys"), vec!["zeta", "alpha", "mid", "b", "c"]);
        assert_eq!(content.category, Category::StructuredData);
        assert_eq!(content.confidence, 0.8);
    }

    #[test]
    fn test_yaml_keys() {
        let content = extract_str("name: demo\nversion: 2\nowner: team\n", ".yaml", Category::Config);
        assert_eq!(content.meta_str("subtype"), Some("yaml"));
        assert_eq!(content.meta_list("keys"), vec!["name", "version", "owner"]);
    }

    #[test]
    fn test_malformed_json_keeps_excerpt() {
        let content = extract_str("{ not json", ".json", Category::StructuredData);
        assert_eq!(content.confidence, 0.8);
        assert_eq!(content.excerpt, "{ not json");
        assert!(!content.metadata.contains_key("keys"));
    }

    #[test]
    fn test_html_headings() {
        let html = "<html><h1>Annual Report</h1><h2 class=\"x\">Revenue</h2><H3>Costs</H3><h4>More</h4></html>";
        let content = extract_str(html, ".html", Category::Markup);
        assert_eq!(content.meta_list("headings"), vec!["Annual Report", "Revenue", "Costs"]);
    }

    #[test]
    fn test_markdown_headings() {
        let metadata = TextExtractor::metadata_for("# Trip Plan\nday one\n## Packing\n", TextFormat::Text);
        assert_eq!(
            metadata.get("headings"),
            Some(&string_list(["Trip Plan", "Packing"]))
        );
    }

    #[test]
    fn test_unaccepted_hint_reports_plain_text() {
        let content = extract_str("hello", ".txt", Category::Unknown);
        assert_eq!(content.category, Category::PlainText);
    }
}
