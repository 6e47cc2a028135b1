//! Filename suggestions: the naming engine seam and case conventions.

mod case;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;

pub use case::{format, CaseFormat};

use crate::analysis::{truncate_chars, FileAnalysis};
use crate::config::{NamingConfig, DEFAULT_COUNT, MAX_FILENAME_LENGTH};

pub const FALLBACK_SUMMARY: &str = "Fallback naming due to API error";

/// What the caller wants back for each file
#[derive(Debug, Clone)]
pub struct NamingRequest {
    pub count: usize,
    pub case_format: CaseFormat,
    pub include_summary: bool,
    /// Character cap applied to each formatted suggestion
    pub max_length: usize,
}

impl Default for NamingRequest {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            case_format: CaseFormat::Snake,
            include_summary: false,
            max_length: MAX_FILENAME_LENGTH,
        }
    }
}

impl NamingRequest {
    pub fn from_config(config: &NamingConfig) -> Self {
        Self {
            count: config.default_count,
            case_format: CaseFormat::parse(&config.default_case),
            include_summary: false,
            max_length: config.max_filename_length,
        }
    }

    /// Case-format a raw suggestion and cap its length
    pub fn finish(&self, raw: &str) -> String {
        let formatted = self.case_format.apply(raw);
        truncate_chars(&formatted, self.max_length)
            .trim_end_matches(['_', '-', ' '])
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamingResult {
    pub suggestions: Vec<String>,
    pub summary: Option<String>,
    pub confidence: f32,
    /// Estimated USD cost of the request
    pub cost: f64,
    pub tokens_used: u32,
}

impl NamingResult {
    /// `{stem}_v{i}` suggestions used when no engine answer is available
    pub fn fallback(analysis: &FileAnalysis, request: &NamingRequest) -> Self {
        let stem = analysis.stem();
        let suggestions = (1..=request.count)
            .map(|i| request.finish(&format!("{}_v{}", stem, i)))
            .collect();

        Self {
            suggestions,
            summary: Some(FALLBACK_SUMMARY.to_string()),
            confidence: 0.3,
            cost: 0.0,
            tokens_used: 0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.summary.as_deref() == Some(FALLBACK_SUMMARY)
    }
}

/// Produces filename suggestions for an analyzed file
#[async_trait]
pub trait NamingEngine: Send + Sync {
    /// Never fails; engines degrade to [`NamingResult::fallback`]
    async fn generate_names(&self, analysis: &FileAnalysis, request: &NamingRequest) -> NamingResult;
}

/// Name every file with at most `max_concurrent` requests in flight.
///
/// Results come back in the order of `analyses`.
pub async fn name_files_concurrently(
    engine: Arc<dyn NamingEngine>,
    analyses: &[FileAnalysis],
    request: &NamingRequest,
    max_concurrent: usize,
) -> Vec<NamingResult> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut futures = FuturesUnordered::new();

    for (index, analysis) in analyses.iter().enumerate() {
        let sem = Arc::clone(&semaphore);
        let engine = Arc::clone(&engine);

        futures.push(async move {
            let result = match sem.acquire().await {
                Ok(_permit) => engine.generate_names(analysis, request).await,
                Err(e) => {
                    tracing::error!("[Naming] Semaphore closed: {}", e);
                    NamingResult::fallback(analysis, request)
                }
            };
            (index, result)
        });
    }

    let total = analyses.len();
    let mut results: Vec<Option<NamingResult>> = vec![None; total];
    let mut completed = 0;

    while let Some((index, result)) = futures.next().await {
        completed += 1;
        tracing::debug!(
            "[Naming] {}/{} complete ({})",
            completed,
            total,
            analyses[index].file_name()
        );
        results[index] = Some(result);
    }

    results
        .into_iter()
        .zip(analyses)
        .map(|(result, analysis)| result.unwrap_or_else(|| NamingResult::fallback(analysis, request)))
        .collect()
}
