//! Commit message synthesis
//!
//! Turns a staged diff into a single-line Conventional Commit candidate by
//! prompting a [`TextGenerator`]. Messages that do not look conventional are
//! still returned, flagged so the caller can warn about them.

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::SecretString;

use crate::ai::prompts;
use crate::ai::provider::{GenerationOptions, TextGenerator};
use crate::error::GenerationError;

/// Message used when there is nothing to describe
pub const EMPTY_DIFF_MESSAGE: &str = "chore: empty diff provided";

/// `type[(scope)][!]: description`
static CONVENTIONAL_COMMIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+(\(.+\))?!?: .+$").expect("valid commit regex"));

/// Whether a message has the Conventional Commit shape
pub fn is_conventional(message: &str) -> bool {
    CONVENTIONAL_COMMIT.is_match(message)
}

/// A proposed commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Trimmed message text
    pub message: String,
    /// Whether the message matched the Conventional Commit shape
    pub conventional: bool,
}

impl Candidate {
    fn new(message: String) -> Self {
        let conventional = is_conventional(&message);
        Self {
            message,
            conventional,
        }
    }
}

/// Settings injected into the synthesizer at construction
#[derive(Debug)]
pub struct SynthesizerConfig {
    /// Provider credential, `None` when not configured
    pub api_key: Option<SecretString>,
    /// Sampling and safety parameters
    pub options: GenerationOptions,
}

impl SynthesizerConfig {
    /// Commit-message defaults with the given credential
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            api_key,
            options: GenerationOptions::commit_message(),
        }
    }
}

/// Builds commit message candidates from diffs
pub struct MessageSynthesizer<G> {
    generator: G,
    config: SynthesizerConfig,
}

impl<G: TextGenerator> MessageSynthesizer<G> {
    pub fn new(generator: G, config: SynthesizerConfig) -> Self {
        Self { generator, config }
    }

    /// Generate a commit message candidate for `diff`
    ///
    /// Fails before any provider call when no API key is configured. A blank
    /// diff yields [`EMPTY_DIFF_MESSAGE`] without calling the provider.
    pub async fn synthesize(&self, diff: &str) -> Result<Candidate, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(GenerationError::MissingApiKey)?;

        if diff.trim().is_empty() {
            tracing::warn!("asked to describe an empty diff");
            return Ok(Candidate::new(EMPTY_DIFF_MESSAGE.to_string()));
        }

        let prompt = prompts::commit_message_prompt(diff);
        let response = self
            .generator
            .generate(api_key, &prompt, &self.config.options)
            .await?;

        let message = response.trim();
        if message.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let candidate = Candidate::new(message.to_string());
        if !candidate.conventional {
            tracing::warn!(
                message = %candidate.message,
                "generated message may not follow the Conventional Commit format"
            );
        }

        Ok(candidate)
    }
}
