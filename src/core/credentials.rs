//! Gemini credential lookup
//!
//! The API key is read from the `GEMINI_API_KEY` environment variable once,
//! at startup, and handed to the message synthesizer as a value.

use secrecy::SecretString;

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Credential lookup for the Gemini API
pub struct CredentialStore;

impl CredentialStore {
    /// Read the Gemini API key from the environment
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn gemini_key() -> Option<SecretString> {
        Self::gemini_key_from(std::env::var(GEMINI_API_KEY_ENV).ok())
    }

    /// Normalize a raw key value
    pub fn gemini_key_from(raw: Option<String>) -> Option<SecretString> {
        raw.map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(SecretString::from)
    }
}
