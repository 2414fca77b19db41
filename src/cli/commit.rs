//! Commit CLI command handler

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use crate::ai::{GeminiClient, MessageSynthesizer, SynthesizerConfig};
use crate::ai::synthesizer::Candidate;
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use crate::core::git::GitRepository;
use crate::core::orchestrator::{CommitOrchestrator, CommitOutcome, CommitState, CommitUi};
use crate::error::Result;

const CONFIRM_PROMPT: &str = "Do you want to use this commit message?";

/// Handle the commit command
pub async fn handle_commit() -> Result<()> {
    let config = Config::load()?;

    let client = GeminiClient::new(&config);
    tracing::debug!(model = client.model_name(), "using Gemini model");

    let synthesizer =
        MessageSynthesizer::new(client, SynthesizerConfig::new(CredentialStore::gemini_key()));
    let mut orchestrator = CommitOrchestrator::new(GitRepository::open_current_dir(), synthesizer);
    let mut ui = TerminalUi::new();

    match orchestrator.run(&mut ui).await? {
        CommitOutcome::Committed { message } => {
            println!("\n🎉 Commit completed successfully!");
            println!("  {}", message);
        }
        CommitOutcome::NothingToCommit => {
            println!("⚠ No changes staged. Nothing to commit.");
        }
    }

    Ok(())
}

/// Terminal front end: status lines and a yes/no prompt defaulting to yes
pub struct TerminalUi {
    interactive: bool,
    current: CommitState,
    spinner: Option<ProgressBar>,
}

impl TerminalUi {
    /// Prompt with dialoguer and show spinners when stdin is a terminal,
    /// otherwise print plain lines and read answers line by line
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
            current: CommitState::Idle,
            spinner: None,
        }
    }

    fn start_step(&mut self, message: &'static str) {
        if self.interactive {
            self.spinner = Some(step_spinner(message));
        } else {
            println!("{}", message);
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitUi for TerminalUi {
    fn enter(&mut self, state: CommitState) {
        self.stop_spinner();
        if let Some(done) = finished_line(self.current, state) {
            println!("✓ {}", done);
        }
        if let Some(start) = started_line(state) {
            self.start_step(start);
        }
        self.current = state;
    }

    fn confirm(&mut self, candidate: &Candidate) -> Result<bool> {
        println!("\n✨ Suggested commit message:");
        println!("\n  \"{}\"\n", candidate.message);
        if !candidate.conventional {
            println!("⚠ This message may not strictly follow the Conventional Commits format.");
        }

        if self.interactive {
            let accepted = Confirm::new()
                .with_prompt(CONFIRM_PROMPT)
                .default(true)
                .interact()?;
            Ok(accepted)
        } else {
            read_answer(&mut io::stdin().lock(), &mut io::stdout())
        }
    }
}

fn step_spinner(message: &'static str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Message announcing the step `state` is starting
fn started_line(state: CommitState) -> Option<&'static str> {
    match state {
        CommitState::CheckingRepo => Some("Checking if inside a git repository..."),
        CommitState::Staging => Some("Staging all changes..."),
        CommitState::CheckingDiff => Some("Verifying staged changes..."),
        CommitState::Analyzing => {
            Some("🤖 Generating commit message (this might take a moment)...")
        }
        CommitState::Committing => Some("Committing changes..."),
        _ => None,
    }
}

/// Message confirming the step `from` completed, given where the run went next
fn finished_line(from: CommitState, to: CommitState) -> Option<&'static str> {
    if to == CommitState::Failed {
        return None;
    }
    match (from, to) {
        (CommitState::CheckingRepo, _) => Some("Git repository detected."),
        (CommitState::Staging, _) => Some("Changes staged."),
        (CommitState::CheckingDiff, CommitState::Analyzing) => Some("Staged changes confirmed."),
        (CommitState::Analyzing, _) => Some("Commit message generated."),
        (CommitState::Committing, _) => Some("Changes committed."),
        _ => None,
    }
}

/// Interpret a typed answer; `None` if it is neither yes nor no
fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask until a yes/no answer is read; end of input accepts
fn read_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool> {
    loop {
        write!(output, "{} [Y/n] ", CONFIRM_PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(true);
        }

        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(output, "Please answer 'y' or 'n'.")?,
        }
    }
}
