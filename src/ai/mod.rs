//! AI integration module
//!
//! This module provides Gemini AI integration for generating
//! Conventional Commit messages from staged diffs.

pub mod gemini;
pub mod prompts;
pub mod provider;
pub mod synthesizer;

pub use gemini::GeminiClient;
pub use provider::{GenerationOptions, TextGenerator};
pub use synthesizer::{Candidate, MessageSynthesizer, SynthesizerConfig};
