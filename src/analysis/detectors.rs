//! File type detection
//!
//! Four independent detectors each guess a [`Category`] with a fixed
//! confidence. [`CompositeDetector`] consults them in a fixed order and keeps
//! the strictly most confident answer, so byte signatures (0.95) beat content
//! heuristics (0.9), which beat the system MIME lookup (0.8), which beats the
//! file extension (0.5).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::Category;
use crate::config::DetectionConfig;

/// Bytes inspected by the signature detector
const SIGNATURE_BYTES: u64 = 512;

/// Characters inspected by the content detector
const CONTENT_CHARS: usize = 1000;

/// Magic prefixes, checked in order; first match wins
pub const SIGNATURES: &[(&[u8], Category)] = &[
    (b"%PDF", Category::DocumentPdf),
    (b"PK\x03\x04", Category::DocumentWord),
    (b"\x89PNG", Category::Image),
    (b"\xff\xd8\xff", Category::Image),
    (b"GIF8", Category::Image),
    (b"BM", Category::Image),
    (b"RIFF", Category::Image),
    (b"\x1f\x8b", Category::Archive),
    (b"7z\xbc\xaf\x27\x1c", Category::Archive),
    (b"Rar!", Category::Archive),
    (b"\x7fELF", Category::Binary),
    (b"MZ", Category::Binary),
    (b"<!DOCTYPE", Category::Markup),
    (b"<html", Category::Markup),
    (b"<?xml", Category::Markup),
    (b"{", Category::StructuredData),
    (b"[", Category::StructuredData),
];

/// One detector's opinion about a file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Signal {
    pub category: Category,
    pub confidence: f32,
}

impl Signal {
    pub fn unknown() -> Self {
        Self {
            category: Category::Unknown,
            confidence: 0.0,
        }
    }
}

/// A strategy that guesses a file's category
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Guess the category; any failure yields [`Category::Unknown`]
    fn classify(&self, path: &Path) -> Category;

    /// Fixed confidence attached to every answer of this detector
    fn confidence(&self) -> f32;
}

// ============================================================================
// MIME lookup
// ============================================================================

/// Asks the system `file` tool for a media type
#[derive(Debug, Default)]
pub struct MimeDetector;

impl MimeDetector {
    fn query(path: &Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }

        duct::cmd!("file", "--brief", "--mime-type", path.as_os_str())
            .stdout_capture()
            .stderr_null()
            .read()
            .map_err(|e| tracing::debug!("[MimeDetector] file tool failed: {}", e))
            .ok()
    }
}

/// Map a media type string to a category
pub fn mime_to_category(mime: &str) -> Category {
    match mime.trim().to_lowercase().as_str() {
        "application/pdf" => Category::DocumentPdf,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        | "application/msword" => Category::DocumentWord,
        "image/jpeg" | "image/png" | "image/gif" | "image/bmp" | "image/tiff"
        | "image/webp" | "image/svg+xml" => Category::Image,
        "text/plain" => Category::PlainText,
        "text/html" | "text/xml" => Category::Markup,
        "text/css" | "text/javascript" | "text/x-python" | "text/x-script.python"
        | "text/x-java" | "text/x-c" | "text/x-c++" | "text/x-go" | "text/x-rust"
        | "text/x-ruby" | "text/x-php" | "text/x-perl" | "text/x-shellscript"
        | "text/x-sql" => Category::SourceCode,
        "text/csv" | "text/tab-separated-values" | "application/json" | "text/x-json" => {
            Category::StructuredData
        }
        "text/x-yaml" | "application/x-yaml" => Category::Config,
        "application/zip" | "application/x-tar" | "application/gzip" => Category::Archive,
        _ => Category::Unknown,
    }
}

impl Detector for MimeDetector {
    fn name(&self) -> &'static str {
        "mime"
    }

    fn classify(&self, path: &Path) -> Category {
        Self::query(path)
            .map(|mime| mime_to_category(&mime))
            .unwrap_or(Category::Unknown)
    }

    fn confidence(&self) -> f32 {
        0.8
    }
}

// ============================================================================
// Byte signatures
// ============================================================================

/// Matches the first bytes against known magic prefixes
#[derive(Debug, Default)]
pub struct SignatureDetector;

impl SignatureDetector {
    pub fn match_header(header: &[u8]) -> Category {
        SIGNATURES
            .iter()
            .find(|(magic, _)| header.starts_with(magic))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Unknown)
    }
}

impl Detector for SignatureDetector {
    fn name(&self) -> &'static str {
        "signature"
    }

    fn classify(&self, path: &Path) -> Category {
        let mut header = Vec::with_capacity(SIGNATURE_BYTES as usize);
        let read = File::open(path).and_then(|f| f.take(SIGNATURE_BYTES).read_to_end(&mut header));

        match read {
            Ok(_) => Self::match_header(&header),
            Err(e) => {
                tracing::debug!("[SignatureDetector] {}: {}", path.display(), e);
                Category::Unknown
            }
        }
    }

    fn confidence(&self) -> f32 {
        0.95
    }
}

// ============================================================================
// Content heuristics
// ============================================================================

static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)\b(function|def|class|interface|struct|enum|import|require|module|package|namespace)\b",
        r"(?i)\b(if|else|elif|while|for|switch|case|break|continue|return)\b",
        r"(?i)\b(var|let|const|int|string|bool|float|double|char|void)\b",
        r"[{}();]",
        r"/\*.*?\*/",
        r"//.*",
        r"#.*",
    ])
});

static MARKUP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"<[^>]+>",
        r"(?m)^\s*#+\s",
        r"(?m)^\s*\*\s",
        r"\[.*?\]\(.*?\)",
    ])
});

static CONFIG_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[r"(?m)^\s*\w+\s*=", r"(?m)^\s*\[.*?\]", r"(?m)^\s*\w+:"])
});

const CODE_KEYWORDS: &[&str] = &[
    "function", "def", "class", "import", "var", "let", "const", "if", "for", "while",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static detector pattern"))
        .collect()
}

/// Scores the leading text against code, markup, and config patterns
#[derive(Debug, Default)]
pub struct ContentDetector;

impl ContentDetector {
    /// Classify already-decoded text
    pub fn classify_text(content: &str) -> Category {
        if Self::looks_like_code(content) {
            Category::SourceCode
        } else if Self::looks_like_markup(content) {
            Category::Markup
        } else if Self::looks_like_config(content) {
            Category::Config
        } else if Self::looks_like_data(content) {
            Category::StructuredData
        } else {
            Category::PlainText
        }
    }

    fn looks_like_code(content: &str) -> bool {
        let pattern_count = CODE_PATTERNS.iter().filter(|re| re.is_match(content)).count();

        let lower = content.to_lowercase();
        let keyword_count = CODE_KEYWORDS
            .iter()
            .filter(|kw| {
                lower.contains(&format!(" {} ", kw)) || lower.starts_with(&format!("{} ", kw))
            })
            .count();

        pattern_count >= 2 || keyword_count >= 2
    }

    fn looks_like_markup(content: &str) -> bool {
        MARKUP_PATTERNS.iter().any(|re| re.is_match(content))
    }

    fn looks_like_config(content: &str) -> bool {
        CONFIG_PATTERNS.iter().any(|re| re.is_match(content))
    }

    fn looks_like_data(content: &str) -> bool {
        let content = content.trim();
        content.starts_with('{')
            || content.starts_with('[')
            || (content.contains(',') && content.matches(',').count() > content.matches('\n').count())
    }
}

/// Decode a byte prefix as UTF-8, tolerating a character cut at the end
pub(crate) fn decode_prefix(bytes: &[u8]) -> Option<&str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&bytes[..e.valid_up_to()]).ok(),
        Err(_) => None,
    }
}

impl Detector for ContentDetector {
    fn name(&self) -> &'static str {
        "content"
    }

    fn classify(&self, path: &Path) -> Category {
        // Up to 4 bytes per char
        let mut bytes = Vec::new();
        let read = File::open(path)
            .and_then(|f| f.take(CONTENT_CHARS as u64 * 4).read_to_end(&mut bytes));

        if let Err(e) = read {
            tracing::debug!("[ContentDetector] {}: {}", path.display(), e);
            return Category::Unknown;
        }

        match decode_prefix(&bytes) {
            Some(text) => {
                let head: String = text.chars().take(CONTENT_CHARS).collect();
                Self::classify_text(&head)
            }
            None => Category::Binary,
        }
    }

    fn confidence(&self) -> f32 {
        0.9
    }
}

// ============================================================================
// Extension lookup
// ============================================================================

/// Static suffix table, optionally extended from configuration
#[derive(Debug, Default)]
pub struct ExtensionDetector {
    overrides: HashMap<String, Category>,
}

impl ExtensionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: &HashMap<String, Category>) -> Self {
        let overrides = overrides
            .iter()
            .map(|(ext, category)| (ext.trim_start_matches('.').to_lowercase(), *category))
            .collect();
        Self { overrides }
    }

    pub fn lookup(&self, ext: &str) -> Category {
        let ext = ext.to_lowercase();
        if let Some(category) = self.overrides.get(&ext) {
            return *category;
        }

        match ext.as_str() {
            "py" | "js" | "ts" | "java" | "cpp" | "c" | "go" | "rs" | "rb" | "php" | "swift"
            | "kt" | "css" | "scss" | "sass" => Category::SourceCode,
            "html" | "htm" | "xml" | "md" | "rst" => Category::Markup,
            "json" => Category::StructuredData,
            "yaml" | "yml" | "ini" | "conf" | "properties" => Category::Config,
            "txt" => Category::PlainText,
            "pdf" => Category::DocumentPdf,
            "docx" | "doc" => Category::DocumentWord,
            _ => Category::Unknown,
        }
    }
}

impl Detector for ExtensionDetector {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn classify(&self, path: &Path) -> Category {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.lookup(ext))
            .unwrap_or(Category::Unknown)
    }

    fn confidence(&self) -> f32 {
        0.5
    }
}

// ============================================================================
// Voting
// ============================================================================

/// Keep the strictly most confident fired signal; ties keep the earlier one.
///
/// A signal whose category is unknown has not fired.
pub fn vote<I: IntoIterator<Item = Signal>>(signals: I) -> Signal {
    signals
        .into_iter()
        .filter(|s| !s.category.is_unknown())
        .fold(None, |best: Option<Signal>, signal| match best {
            Some(b) if b.confidence >= signal.confidence => Some(b),
            _ => Some(signal),
        })
        .unwrap_or_else(Signal::unknown)
}

/// Consults detectors in configured order and votes on their answers
pub struct CompositeDetector {
    detectors: Vec<Box<dyn Detector>>,
}

impl CompositeDetector {
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Standard order: MIME, signature, content, extension
    pub fn from_config(config: &DetectionConfig) -> Self {
        let mut detectors: Vec<Box<dyn Detector>> = Vec::with_capacity(4);
        if config.use_mime {
            detectors.push(Box::new(MimeDetector));
        }
        detectors.push(Box::new(SignatureDetector));
        detectors.push(Box::new(ContentDetector));
        detectors.push(Box::new(ExtensionDetector::with_overrides(&config.extensions)));
        Self::new(detectors)
    }

    pub fn detect(&self, path: &Path) -> Signal {
        let signals = self.detectors.iter().map(|detector| {
            let category = detector.classify(path);
            tracing::debug!(
                "[Detector] {} -> {} ({:.2}) for {}",
                detector.name(),
                category,
                detector.confidence(),
                path.display()
            );
            Signal {
                category,
                confidence: detector.confidence(),
            }
        });

        vote(signals.collect::<Vec<_>>())
    }

    /// Confidence of the most reliable configured detector
    pub fn confidence(&self) -> f32 {
        self.detectors
            .iter()
            .map(|d| d.confidence())
            .fold(0.0, f32::max)
    }
}

impl Default for CompositeDetector {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}
