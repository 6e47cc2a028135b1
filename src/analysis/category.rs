use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Closed classification assigned to a file once per analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    DocumentPdf,
    DocumentWord,
    SourceCode,
    PlainText,
    Markup,
    Config,
    StructuredData,
    Archive,
    Image,
    Binary,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::DocumentPdf,
        Category::DocumentWord,
        Category::SourceCode,
        Category::PlainText,
        Category::Markup,
        Category::Config,
        Category::StructuredData,
        Category::Archive,
        Category::Image,
        Category::Binary,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DocumentPdf => "document-pdf",
            Category::DocumentWord => "document-word",
            Category::SourceCode => "source-code",
            Category::PlainText => "plain-text",
            Category::Markup => "markup",
            Category::Config => "config",
            Category::StructuredData => "structured-data",
            Category::Archive => "archive",
            Category::Image => "image",
            Category::Binary => "binary",
            Category::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Category::Unknown)
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse the kebab-case name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| Error::Config(format!("Unknown category: {}", s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
