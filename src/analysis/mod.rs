//! File analysis: category detection followed by content extraction.

mod category;
mod content;
pub mod detectors;
pub mod extractors;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

pub use category::Category;
pub use content::{
    string_list, truncate_chars, ExtractOptions, ExtractedContent, Metadata, MAX_CHARS_DEFAULT,
};
pub use detectors::{CompositeDetector, Signal};
pub use extractors::CompositeExtractor;

use crate::config::Config;
use crate::error::{Error, Result};

/// Everything known about one file before naming
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub category: Category,
    pub detection_confidence: f32,
    pub content: ExtractedContent,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

impl FileAnalysis {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension including the leading dot, or empty
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }
}

/// Detector and extractor chains built once from the configuration
pub struct Analyzer {
    detector: CompositeDetector,
    extractor: CompositeExtractor,
    max_chars: usize,
    enable_ocr: bool,
}

impl Analyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            detector: CompositeDetector::from_config(&config.detection),
            extractor: CompositeExtractor::standard(),
            max_chars: config.extraction.max_chars,
            enable_ocr: config.extraction.enable_ocr,
        }
    }

    pub fn analyze(&self, path: &Path) -> Result<FileAnalysis> {
        let meta = fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        if !meta.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let signal = self.detector.detect(path);
        let options = ExtractOptions::for_category(signal.category)
            .with_max_chars(self.max_chars)
            .with_ocr(self.enable_ocr);
        let content = self.extractor.extract(path, &options);

        tracing::info!(
            "[Analyzer] {} -> {} via {} ({:.2})",
            path.display(),
            signal.category,
            content.method,
            content.confidence
        );

        Ok(FileAnalysis {
            path: path.to_path_buf(),
            category: signal.category,
            detection_confidence: signal.confidence,
            content,
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Local>::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use tempfile::tempdir;

    fn offline_analyzer() -> Analyzer {
        let config = Config {
            detection: DetectionConfig {
                use_mime: false,
                ..Default::default()
            },
            ..Default::default()
        };
        Analyzer::new(&config)
    }

    #[test]
    fn test_analyze_source_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script.py");
        fs::write(&path, "import os\n\ndef main():\n    pass\n").unwrap();

        let analysis = offline_analyzer().analyze(&path).unwrap();
        assert_eq!(analysis.category, Category::SourceCode);
        assert_eq!(analysis.content.method, "code_extractor");
        assert_eq!(analysis.size, 32);
        assert_eq!(analysis.stem(), "script");
        assert_eq!(analysis.extension(), ".py");
        assert!(analysis.modified.is_some());
    }

    #[test]
    fn test_analyze_respects_max_chars() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "lorem ipsum ".repeat(200)).unwrap();

        let mut config = Config::default();
        config.detection.use_mime = false;
        config.extraction.max_chars = 25;

        let analysis = Analyzer::new(&config).analyze(&path).unwrap();
        assert_eq!(analysis.content.excerpt.chars().count(), 25);
    }

    #[test]
    fn test_analyze_missing_file() {
        let err = offline_analyzer()
            .analyze(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_analyze_directory_rejected() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            offline_analyzer().analyze(dir.path()),
            Err(Error::NotFound(_))
        ));
    }
}
