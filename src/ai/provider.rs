//! Text generation provider abstraction

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;

use crate::error::GenerationError;

/// Harm categories the provider classifies prompts and output into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

/// Severity at which the provider blocks content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

/// One safety filter entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: BlockThreshold,
}

/// Sampling and safety parameters for one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub safety: Vec<SafetySetting>,
}

impl GenerationOptions {
    /// Low-randomness, short-output settings used for commit messages.
    /// Every harm category blocks at medium severity and above.
    pub fn commit_message() -> Self {
        let safety = [
            HarmCategory::Harassment,
            HarmCategory::HateSpeech,
            HarmCategory::SexuallyExplicit,
            HarmCategory::DangerousContent,
        ]
        .into_iter()
        .map(|category| SafetySetting {
            category,
            threshold: BlockThreshold::BlockMediumAndAbove,
        })
        .collect();

        Self {
            temperature: 0.4,
            top_k: 1,
            top_p: 1.0,
            max_output_tokens: 150,
            safety,
        }
    }
}

/// A generative-text backend
///
/// This abstraction allows mocking the provider in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt`, returning the raw (untrimmed) text
    async fn generate(
        &self,
        api_key: &SecretString,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;
}
