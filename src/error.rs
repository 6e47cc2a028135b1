//! Error types for rename-with-llm

use std::path::PathBuf;

use thiserror::Error;

use crate::analysis::Category;

/// Result type for application-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level errors (config, API, rename I/O)
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required credential is not configured
    #[error("{0} environment variable is required")]
    MissingApiKey(&'static str),

    /// Outbound naming request failed
    #[error("OpenAI API error: {0}")]
    Api(String),

    /// File does not exist or is not a regular file
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Rename refused by the safety checks
    #[error("Unsafe rename: {0}")]
    Unsafe(String),
}

/// Why a single extractor could not produce real content.
///
/// Extractors never surface these to callers of `extract`; they are folded
/// into a low-confidence placeholder instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Optional backend compiled out or external tool missing
    #[error("{0} not installed")]
    Unavailable(&'static str),

    /// I/O, permission, or decoding failure
    #[error("{0}")]
    Unreadable(#[from] std::io::Error),

    /// No extractor declares support for the category
    #[error("no extractor for category {0}")]
    Unsupported(Category),

    /// Backend could not parse the content
    #[error("{0}")]
    Malformed(String),
}

impl ExtractError {
    /// Confidence of the placeholder produced for this failure
    pub fn placeholder_confidence(&self) -> f32 {
        match self {
            ExtractError::Unavailable(_) => 0.0,
            _ => 0.1,
        }
    }
}
