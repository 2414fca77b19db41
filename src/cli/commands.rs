//! CLI command definitions using clap
//!
//! Defines the command structure for the `git-cli` tool.

use clap::{Parser, Subcommand};

/// git-cli - AI-assisted git commits
///
/// A CLI tool extending git with AI-generated Conventional Commit messages.
/// Run without arguments to show this help.
#[derive(Parser, Debug)]
#[command(name = "git-cli", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Stage all changes, generate an AI-powered commit message, and commit
    Commit,
}
