//! Gemini API client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ai::provider::{GenerationOptions, SafetySetting, TextGenerator};
use crate::core::config::{Config, GeminiModel};
use crate::error::GenerationError;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reason reported when output was withheld for safety
/// Finish reasons of a completed candidate; any other reason is a refusal
const COMPLETED_FINISH_REASONS: &[&str] = &["STOP", "MAX_TOKENS", "FINISH_REASON_UNSPECIFIED"];

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: GeminiModel,
}

impl GeminiClient {
    /// Create a client for the configured model and endpoint
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config.api_base(), config.gemini_model)
    }

    /// Create a client against an explicit endpoint
    pub fn with_base_url(api_base: &str, model: GeminiModel) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Get the current model name
    pub fn model_name(&self) -> &str {
        self.model.display_name()
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.api_base, self.model.api_name())
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        api_key: &SecretString,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let request_body = GeminiRequest::new(prompt, options);

        tracing::debug!(model = self.model.api_name(), "sending generation request");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(GenerationError::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body = response.text().await.map_err(GenerationError::Transport)?;
        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        extract_text(gemini_response)
    }
}

/// Pull the completion text out of a response, turning blocks into errors
fn extract_text(response: GeminiResponse) -> Result<String, GenerationError> {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            tracing::error!(
                block_reason = %reason,
                ratings = %describe_ratings(&feedback.safety_ratings),
                "Gemini blocked the prompt"
            );
            return Err(GenerationError::Blocked {
                reason: reason.clone(),
            });
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    if let Some(finish) = candidate
        .finish_reason
        .as_deref()
        .filter(|r| !COMPLETED_FINISH_REASONS.contains(r))
    {
        let blocked: Vec<&str> = candidate
            .safety_ratings
            .iter()
            .filter(|r| r.blocked)
            .map(|r| r.category.as_str())
            .collect();
        let reason = if blocked.is_empty() {
            finish.to_string()
        } else {
            blocked.join(", ")
        };
        tracing::error!(
            finish_reason = %finish,
            ratings = %describe_ratings(&candidate.safety_ratings),
            "Gemini withheld the response"
        );
        return Err(GenerationError::Blocked { reason });
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text)
}

fn describe_ratings(ratings: &[SafetyRating]) -> String {
    ratings
        .iter()
        .map(|r| format!("{}={}", r.category, r.probability.as_deref().unwrap_or("?")))
        .collect::<Vec<_>>()
        .join(", ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini API Request/Response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiRequest {
    fn new(prompt: &str, options: &GenerationOptions) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_k: options.top_k,
                top_p: options.top_p,
                max_output_tokens: options.max_output_tokens,
            },
            safety_settings: options.safety.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SafetyRating {
    category: String,
    #[serde(default)]
    probability: Option<String>,
    #[serde(default)]
    blocked: bool,
}
