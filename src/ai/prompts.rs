use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::FileAnalysis;
use crate::naming::{CaseFormat, NamingRequest};

/// Marker the model is asked to put before the summary
pub const SUMMARY_MARKER: &str = "SUMMARY:";

/// List numbering or bullet at the start of a suggestion line
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+\s*[.)]|[-*•])\s*").expect("static list marker pattern"));

/// Metadata lists quoted in the prompt, with their labels
const LIST_FIELDS: &[(&str, &str)] = &[
    ("functions", "Functions"),
    ("classes", "Classes"),
    ("headings", "Headings"),
];

const MAX_LIST_ITEMS: usize = 3;

/// Excerpt and the metadata fields worth showing the model
pub fn describe_content(analysis: &FileAnalysis) -> String {
    let content = &analysis.content;
    let mut parts = Vec::new();

    if !content.excerpt.is_empty() {
        parts.push(format!("Content: {}", content.excerpt));
    }

    for (key, label) in [("title", "Title"), ("author", "Author"), ("subject", "Subject")] {
        if let Some(value) = content.meta_str(key) {
            parts.push(format!("{}: {}", label, value));
        }
    }

    for (key, label) in LIST_FIELDS {
        let items = content.meta_list(key);
        if !items.is_empty() {
            let shown: Vec<&str> = items.into_iter().take(MAX_LIST_ITEMS).collect();
            parts.push(format!("{}: {}", label, shown.join(", ")));
        }
    }

    parts.join("\n")
}

pub fn case_instruction(case_format: CaseFormat, max_length: usize) -> String {
    format!("{}, <{} chars, descriptive", case_format, max_length)
}

/// Build the user prompt for one file
pub fn build_naming_prompt(analysis: &FileAnalysis, request: &NamingRequest) -> String {
    let count = request.count;
    let max_length = request.max_length;

    let numbered: Vec<String> = (1..=count).map(|i| format!("{}. filename{}", i, i)).collect();

    let mut prompt = format!(
        r#"Analyze this file and suggest {count} descriptive filenames.

{content}

Current filename: {current}
Format: {instruction}
Max length: {max_length} characters

Suggest {count} filenames that are:
- Descriptive of the main content
- Professional and clear
- Under {max_length} characters
- Use {case} format

Return format:
{numbered}"#,
        count = count,
        content = describe_content(analysis),
        current = analysis.file_name(),
        instruction = case_instruction(request.case_format, max_length),
        max_length = max_length,
        case = request.case_format,
        numbered = numbered.join("\n"),
    );

    if request.include_summary {
        prompt.push_str("\n\nAlso provide a brief 1-2 sentence summary of the file content.\n\n");
        prompt.push_str(SUMMARY_MARKER);
        prompt.push('\n');
    }

    prompt
}

/// Split a completion into raw suggestions and an optional summary
pub fn parse_naming_response(response: &str, include_summary: bool) -> (Vec<String>, Option<String>) {
    let (listing, summary) = match response.split_once(SUMMARY_MARKER) {
        Some((listing, summary)) if include_summary => {
            let summary = summary.trim();
            (listing, (!summary.is_empty()).then(|| summary.to_string()))
        }
        _ => (response, None),
    };

    let suggestions = listing
        .lines()
        .filter_map(|line| {
            let marker = LIST_MARKER.find(line)?;
            let suggestion = line[marker.end()..]
                .trim()
                .trim_matches(|c| c == '"' || c == '\'' || c == '`')
                .trim();
            (!suggestion.is_empty()).then(|| suggestion.to_string())
        })
        .collect();

    (suggestions, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Category, ExtractedContent, Metadata};
    use serde_json::json;
    use std::path::PathBuf;

    fn analysis_with(metadata: Metadata) -> FileAnalysis {
        FileAnalysis {
            path: PathBuf::from("/tmp/scan001.pdf"),
            category: Category::DocumentPdf,
            detection_confidence: 0.95,
            content: ExtractedContent::new(
                "Invoice from Acme".to_string(),
                metadata,
                Category::DocumentPdf,
                0.9,
                "pdf_extractor",
            ),
            size: 1024,
            modified: None,
        }
    }

    #[test]
    fn test_describe_content_includes_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("title".into(), json!("Invoice 42"));
        metadata.insert("author".into(), json!(""));
        metadata.insert("headings".into(), json!(["One", "Two", "Three", "Four"]));

        let described = describe_content(&analysis_with(metadata));
        assert_eq!(
            described,
            "Content: Invoice from Acme\nTitle: Invoice 42\nHeadings: One, Two, Three"
        );
    }

    #[test]
    fn test_prompt_mentions_request() {
        let request = NamingRequest {
            count: 2,
            case_format: CaseFormat::Kebab,
            include_summary: true,
            max_length: 50,
        };
        let prompt = build_naming_prompt(&analysis_with(Metadata::new()), &request);

        assert!(prompt.starts_with("Analyze this file and suggest 2 descriptive filenames."));
        assert!(prompt.contains("Current filename: scan001.pdf"));
        assert!(prompt.contains("Format: kebab-case, <50 chars, descriptive"));
        assert!(prompt.contains("1. filename1\n2. filename2"));
        assert!(prompt.ends_with("SUMMARY:\n"));
    }

    #[test]
    fn test_parse_numbered_and_bulleted() {
        let response = "Here you go:\n1. acme_invoice_march\n2) \"acme billing\"\n- invoice acme 2024\n* `acme-receipt`\nnot a suggestion";
        let (suggestions, summary) = parse_naming_response(response, false);
        assert_eq!(
            suggestions,
            vec!["acme_invoice_march", "acme billing", "invoice acme 2024", "acme-receipt"]
        );
        assert_eq!(summary, None);
    }

    #[test]
    fn test_parse_keeps_leading_digits_of_name() {
        let (suggestions, _) = parse_naming_response("1. 2024 budget review", false);
        assert_eq!(suggestions, vec!["2024 budget review"]);
    }

    #[test]
    fn test_parse_summary_section() {
        let response = "1. trip_plan\n2. travel_itinerary\n\nSUMMARY:\nA two-week itinerary for Japan.";
        let (suggestions, summary) = parse_naming_response(response, true);
        assert_eq!(suggestions, vec!["trip_plan", "travel_itinerary"]);
        assert_eq!(summary.as_deref(), Some("A two-week itinerary for Japan."));
    }

    #[test]
    fn test_summary_ignored_when_not_requested() {
        let response = "1. trip_plan\nSUMMARY: text";
        let (suggestions, summary) = parse_naming_response(response, false);
        assert_eq!(suggestions, vec!["trip_plan"]);
        assert_eq!(summary, None);
    }
}
