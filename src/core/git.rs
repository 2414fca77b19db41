//! Local git repository operations
//!
//! This module shells out to the system `git` binary (inheriting the user's
//! config, hooks and signing setup) for:
//! - Repository detection
//! - Staging the working tree
//! - Staged diff extraction
//! - Committing with a given message

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use git2::Repository;
use tokio::process::Command;

use crate::error::CommandError;

/// Result of asking git whether the index differs from HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedChanges {
    /// Index matches HEAD
    None,
    /// At least one staged difference
    Present,
}

/// Version-control operations the commit workflow depends on
///
/// This abstraction allows mocking git in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Whether the working directory is inside a (non-bare) repository.
    /// Any failure while checking counts as "no".
    async fn is_repository(&self) -> bool;

    /// Stage every change in the working tree
    async fn stage_all(&self) -> Result<(), CommandError>;

    /// Unified diff of the index against HEAD, without color codes
    async fn staged_diff(&self) -> Result<String, CommandError>;

    /// Whether anything is staged
    async fn staged_changes(&self) -> Result<StagedChanges, CommandError>;

    /// Commit the index with the given message
    async fn commit(&self, message: &str) -> Result<(), CommandError>;
}

/// `git` command-line wrapper bound to a working directory
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
}

impl GitRepository {
    /// Operate on the current directory
    pub fn open_current_dir() -> Self {
        Self::at(".")
    }

    /// Operate on the given directory
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self {
            workdir: path.as_ref().to_path_buf(),
        }
    }

    /// The directory git commands run in
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run git and return the raw output, whatever its exit status
    async fn output(&self, args: &[&str], rendered: &str) -> Result<Output, CommandError> {
        tracing::debug!(command = %rendered, workdir = %self.workdir.display(), "running git");

        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CommandError {
                command: rendered.to_string(),
                exit_code: None,
                stderr: format!("failed to execute git: {}", e),
            })
    }

    /// Run git, requiring success, and return stdout
    async fn run(&self, args: &[&str], rendered: &str) -> Result<String, CommandError> {
        let output = self.output(args, rendered).await?;

        if !output.status.success() {
            return Err(command_error(rendered, &output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VersionControl for GitRepository {
    async fn is_repository(&self) -> bool {
        match Repository::discover(&self.workdir) {
            Ok(repo) => !repo.is_bare(),
            Err(e) => {
                tracing::debug!(error = %e, "repository discovery failed");
                false
            }
        }
    }

    async fn stage_all(&self) -> Result<(), CommandError> {
        self.run(&["add", "--all"], "git add --all").await?;
        Ok(())
    }

    async fn staged_diff(&self) -> Result<String, CommandError> {
        let diff = self
            .run(
                &["diff", "--staged", "--no-color"],
                "git diff --staged --no-color",
            )
            .await?;
        Ok(diff.trim_end().to_string())
    }

    async fn staged_changes(&self) -> Result<StagedChanges, CommandError> {
        let rendered = "git diff --staged --quiet";
        let output = self
            .output(&["diff", "--staged", "--quiet"], rendered)
            .await?;

        // --quiet implies --exit-code: 1 means "differences found", not failure
        match output.status.code() {
            Some(0) => Ok(StagedChanges::None),
            Some(1) => Ok(StagedChanges::Present),
            code => {
                tracing::warn!(?code, "unexpected exit status checking staged changes");
                Err(command_error(rendered, &output))
            }
        }
    }

    async fn commit(&self, message: &str) -> Result<(), CommandError> {
        // The message is a single argv element; no shell sees it
        let rendered = format!("git commit -m {}", quote_message(message));
        self.run(&["commit", "-m", message], &rendered).await?;
        Ok(())
    }
}

fn command_error(rendered: &str, output: &Output) -> CommandError {
    CommandError {
        command: rendered.to_string(),
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Render a commit message as a double-quoted shell word
///
/// Backslash, double quote, backtick and dollar are backslash-escaped, so the
/// rendered command line can be pasted into a POSIX shell verbatim.
pub fn quote_message(message: &str) -> String {
    let mut quoted = String::with_capacity(message.len() + 2);
    quoted.push('"');
    for c in message.chars() {
        if matches!(c, '\\' | '"' | '`' | '$') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
