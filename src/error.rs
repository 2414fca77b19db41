//! Custom error types for git-cli
//!
//! User-friendly error messages for every way a commit run can fail.

use thiserror::Error;

/// A single `git` invocation that did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{command}` failed ({}): {}", describe_exit(*exit_code), stderr.trim())]
pub struct CommandError {
    /// Rendered command line, for display only
    pub command: String,
    /// Process exit code, `None` if the process could not be spawned or was killed
    pub exit_code: Option<i32>,
    /// Captured error stream
    pub stderr: String,
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(|| "no exit code".to_string(), |c| format!("exit code {}", c))
}

/// Failures while producing a commit message with the Gemini API
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key in the environment
    #[error("GEMINI_API_KEY environment variable is not set.\n\n  → Get an API key from Google AI Studio: https://aistudio.google.com/apikey\n  → Export it in your shell: export GEMINI_API_KEY=YOUR_KEY")]
    MissingApiKey,

    /// The provider refused to generate content
    #[error("Commit message generation was blocked by safety settings: {reason}")]
    Blocked { reason: String },

    /// The provider answered without any text
    #[error("Gemini returned an empty response.")]
    EmptyResponse,

    /// Network or timeout failure talking to the provider
    #[error("Could not reach the Gemini API: {0}\n\n  → Check your internet connection.")]
    Transport(#[source] reqwest::Error),

    /// Non-success HTTP status from the provider
    #[error("Gemini API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Body could not be decoded
    #[error("Failed to parse Gemini response: {0}")]
    InvalidResponse(String),
}

/// Main error type for git-cli
#[derive(Error, Debug)]
pub enum GitCliError {
    /// Not running in a git repository
    #[error("Not inside a git repository. Aborting.\n\n  → Run 'git init' to create one, or navigate to an existing git project.")]
    NotGitRepository,

    /// `git add` failed
    #[error("Failed to stage changes: {0}")]
    Staging(#[source] CommandError),

    /// Checking for staged changes failed for a reason other than "no changes"
    #[error("Failed to check staged changes: {0}")]
    StagedCheck(#[source] CommandError),

    /// Extracting the staged diff failed
    #[error("Failed to read staged diff: {0}")]
    Diff(#[source] CommandError),

    /// Staged changes were reported but the diff came back empty
    #[error("No diff content detected. Cannot generate a commit message.\n\n  → Run 'git diff --staged' to inspect what is staged.")]
    EmptyDiff,

    /// Commit message generation failed
    #[error("Failed to generate commit message: {0}")]
    Generation(#[from] GenerationError),

    /// `git commit` failed
    #[error("Failed to commit changes: {0}\n\n  → Your changes are still staged; fix the problem and run the command again.")]
    Commit(#[source] CommandError),

    /// Reading the confirmation answer failed
    #[error("Could not read confirmation: {0}")]
    Prompt(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl GitCliError {
    /// Whether the failure is the missing credential case
    pub fn is_missing_api_key(&self) -> bool {
        matches!(self, GitCliError::Generation(GenerationError::MissingApiKey))
    }
}

impl From<toml::de::Error> for GitCliError {
    fn from(err: toml::de::Error) -> Self {
        GitCliError::Toml(err.to_string())
    }
}

impl From<dialoguer::Error> for GitCliError {
    fn from(err: dialoguer::Error) -> Self {
        GitCliError::Prompt(err.to_string())
    }
}

/// Result type alias using GitCliError
pub type Result<T> = std::result::Result<T, GitCliError>;
