use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_client::openai_client;
use super::prompts::{build_naming_prompt, parse_naming_response};
use crate::analysis::FileAnalysis;
use crate::error::{Error, Result};
use crate::naming::{NamingEngine, NamingRequest, NamingResult};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f32 = 0.7;

/// USD per 1K (input, output) tokens
const PRICING: &[(&str, (f64, f64))] = &[
    ("gpt-4.1-nano", (0.0001, 0.0004)),
    ("gpt-4o-mini", (0.00015, 0.0006)),
    ("gpt-3.5-turbo", (0.0015, 0.002)),
    ("gpt-4", (0.03, 0.06)),
];

/// Per-1K token prices for `model`; unknown models are billed as gpt-4o-mini
pub fn pricing(model: &str) -> (f64, f64) {
    PRICING
        .iter()
        .find(|(name, _)| *name == model)
        .or_else(|| PRICING.iter().find(|(name, _)| *name == DEFAULT_MODEL))
        .map(|(_, prices)| *prices)
        .unwrap_or((0.00015, 0.0006))
}

pub fn estimate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
    let (input_price, output_price) = pricing(model);
    (input_tokens as f64 * input_price + output_tokens as f64 * output_price) / 1000.0
}

/// Completion budget: 20 tokens per suggestion, 50 more for a summary
pub fn max_tokens_for(request: &NamingRequest) -> u32 {
    let summary = if request.include_summary { 50 } else { 0 };
    (request.count as u32) * 20 + summary
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Chat-completions naming engine
pub struct OpenAiNamingEngine {
    client: &'static Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAiNamingEngine {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: openai_client(),
            api_key: api_key.into(),
            model: model.into(),
            api_url: OPENAI_API_URL.to_string(),
        }
    }

    /// Key from `OPENAI_API_KEY`
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingApiKey(ENV_API_KEY))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user message and return the completion text
    pub async fn send_message(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Api(format!("Request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(Error::Api(api_error.error.message));
            }
            return Err(Error::Api(format!("({}): {}", status, error_text)));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Api(format!("Failed to parse response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Api("No response from OpenAI".to_string()))
    }

    async fn try_generate(
        &self,
        analysis: &FileAnalysis,
        request: &NamingRequest,
    ) -> Result<NamingResult> {
        let prompt = build_naming_prompt(analysis, request);

        // Rough estimate: one token per whitespace-separated word
        let input_tokens = prompt.split_whitespace().count() as u32;
        let output_tokens = max_tokens_for(request);

        let completion = self.send_message(&prompt, output_tokens).await?;
        let (raw, summary) = parse_naming_response(&completion, request.include_summary);

        let suggestions: Vec<String> = raw
            .iter()
            .map(|s| request.finish(s))
            .filter(|s| !s.is_empty())
            .take(request.count)
            .collect();

        Ok(NamingResult {
            suggestions,
            summary,
            confidence: 0.9,
            cost: estimate_cost(&self.model, input_tokens, output_tokens),
            tokens_used: input_tokens + output_tokens,
        })
    }
}

#[async_trait]
impl NamingEngine for OpenAiNamingEngine {
    async fn generate_names(&self, analysis: &FileAnalysis, request: &NamingRequest) -> NamingResult {
        match self.try_generate(analysis, request).await {
            Ok(result) => {
                tracing::info!(
                    "[OpenAI] {} suggestions for {} (${:.5}, {} tokens)",
                    result.suggestions.len(),
                    analysis.file_name(),
                    result.cost,
                    result.tokens_used
                );
                result
            }
            Err(e) => {
                tracing::warn!(
                    "[OpenAI] Naming failed for {}, using fallback: {}",
                    analysis.file_name(),
                    e
                );
                NamingResult::fallback(analysis, request)
            }
        }
    }
}
