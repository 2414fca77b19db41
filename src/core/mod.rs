//! Core functionality for git-cli
//!
//! This module contains the business logic of a commit run:
//! - Git repository operations
//! - Credential lookup
//! - Application configuration
//! - The commit workflow state machine

pub mod config;
pub mod credentials;
pub mod git;
pub mod orchestrator;

pub use config::Config;
pub use credentials::CredentialStore;
pub use git::{GitRepository, StagedChanges, VersionControl};
pub use orchestrator::{CommitOrchestrator, CommitOutcome, CommitState, CommitUi};
