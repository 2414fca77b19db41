//! git-cli - AI-assisted git commits
//!
//! This library stages the working tree, asks Gemini for a Conventional
//! Commit message describing the staged diff, lets a human approve or
//! regenerate it, and commits with the approved message.

pub mod ai;
pub mod cli;
pub mod core;
pub mod error;

pub use error::{CommandError, GenerationError, GitCliError, Result};
