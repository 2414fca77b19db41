//! Commit workflow state machine
//!
//! Drives one commit run: repository check, staging, staged-changes check,
//! diff extraction, the synthesize/approve loop, and the final commit. Every
//! step finishes before the next one starts; nothing is rolled back when a
//! later step fails.

use crate::ai::provider::TextGenerator;
use crate::ai::synthesizer::{Candidate, MessageSynthesizer};
use crate::core::git::{StagedChanges, VersionControl};
use crate::error::{GitCliError, Result};

/// Position of a commit run in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitState {
    /// Not started
    #[default]
    Idle,
    /// Verifying we are inside a repository
    CheckingRepo,
    /// Staging the whole working tree
    Staging,
    /// Asking git whether anything is staged
    CheckingDiff,
    /// Reading the diff and generating a candidate message
    Analyzing,
    /// Waiting for the human to accept or reject the candidate
    AwaitingApproval,
    /// Running `git commit`
    Committing,
    /// Finished successfully (committed, or nothing to commit)
    Done,
    /// Aborted by an error
    Failed,
}

impl CommitState {
    /// Whether the workflow may move from `self` to `next`
    pub fn can_transition_to(self, next: CommitState) -> bool {
        use CommitState::*;

        match (self, next) {
            (Done, _) | (Failed, _) => false,
            (_, Failed) => true,
            (Idle, CheckingRepo)
            | (CheckingRepo, Staging)
            | (Staging, CheckingDiff)
            | (CheckingDiff, Done)
            | (CheckingDiff, Analyzing)
            | (Analyzing, AwaitingApproval)
            | (AwaitingApproval, Analyzing)
            | (AwaitingApproval, Committing)
            | (Committing, Done) => true,
            _ => false,
        }
    }

    /// Whether the run is over
    pub fn is_terminal(self) -> bool {
        matches!(self, CommitState::Done | CommitState::Failed)
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created with this message
    Committed { message: String },
    /// Nothing was staged after staging the working tree
    NothingToCommit,
}

/// Front end of a commit run: progress display and approval
///
/// Implemented by the terminal UI and by scripted test doubles.
pub trait CommitUi {
    /// Called on every state change
    fn enter(&mut self, state: CommitState);

    /// Show a candidate and ask whether to use it
    fn confirm(&mut self, candidate: &Candidate) -> Result<bool>;
}

/// Runs the commit workflow against a repository and a message synthesizer
pub struct CommitOrchestrator<V, G> {
    vcs: V,
    synthesizer: MessageSynthesizer<G>,
    state: CommitState,
}

impl<V: VersionControl, G: TextGenerator> CommitOrchestrator<V, G> {
    pub fn new(vcs: V, synthesizer: MessageSynthesizer<G>) -> Self {
        Self {
            vcs,
            synthesizer,
            state: CommitState::Idle,
        }
    }

    /// Current workflow state
    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Run the workflow to completion
    pub async fn run<U: CommitUi>(&mut self, ui: &mut U) -> Result<CommitOutcome> {
        match self.drive(ui).await {
            Ok(outcome) => {
                self.transition(CommitState::Done, ui);
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!(state = ?self.state, error = %e, "commit run failed");
                self.transition(CommitState::Failed, ui);
                Err(e)
            }
        }
    }

    async fn drive<U: CommitUi>(&mut self, ui: &mut U) -> Result<CommitOutcome> {
        self.transition(CommitState::CheckingRepo, ui);
        if !self.vcs.is_repository().await {
            return Err(GitCliError::NotGitRepository);
        }

        self.transition(CommitState::Staging, ui);
        self.vcs.stage_all().await.map_err(GitCliError::Staging)?;

        self.transition(CommitState::CheckingDiff, ui);
        let staged = self
            .vcs
            .staged_changes()
            .await
            .map_err(GitCliError::StagedCheck)?;
        if staged == StagedChanges::None {
            return Ok(CommitOutcome::NothingToCommit);
        }

        self.transition(CommitState::Analyzing, ui);
        let diff = self.vcs.staged_diff().await.map_err(GitCliError::Diff)?;
        if diff.trim().is_empty() {
            return Err(GitCliError::EmptyDiff);
        }

        let message = self.approve_loop(&diff, ui).await?;

        self.transition(CommitState::Committing, ui);
        self.vcs
            .commit(&message)
            .await
            .map_err(GitCliError::Commit)?;

        Ok(CommitOutcome::Committed { message })
    }

    /// Synthesize, present, decide; repeat until a candidate is accepted
    async fn approve_loop<U: CommitUi>(&mut self, diff: &str, ui: &mut U) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let candidate = self.synthesizer.synthesize(diff).await?;
            tracing::debug!(attempt, message = %candidate.message, "candidate generated");

            self.transition(CommitState::AwaitingApproval, ui);
            if ui.confirm(&candidate)? {
                return Ok(candidate.message);
            }

            self.transition(CommitState::Analyzing, ui);
        }
    }

    fn transition<U: CommitUi>(&mut self, next: CommitState, ui: &mut U) {
        let allowed = self.state.can_transition_to(next);
        debug_assert!(allowed, "illegal transition {:?} -> {:?}", self.state, next);
        if !allowed {
            tracing::warn!(from = ?self.state, to = ?next, "illegal commit state transition");
            return;
        }
        tracing::debug!(from = ?self.state, to = ?next, "commit state");
        self.state = next;
        ui.enter(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::MockTextGenerator;
    use crate::ai::synthesizer::SynthesizerConfig;
    use crate::core::git::MockVersionControl;
    use crate::error::{CommandError, GenerationError};
    use secrecy::SecretString;
    use std::collections::VecDeque;

    /// Answers confirmations from a script and records visited states
    #[derive(Default)]
    struct ScriptedUi {
        answers: VecDeque<bool>,
        states: Vec<CommitState>,
        shown: Vec<String>,
    }

    impl ScriptedUi {
        fn answering(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl CommitUi for ScriptedUi {
        fn enter(&mut self, state: CommitState) {
            self.states.push(state);
        }

        fn confirm(&mut self, candidate: &Candidate) -> Result<bool> {
            self.shown.push(candidate.message.clone());
            Ok(self.answers.pop_front().unwrap_or(true))
        }
    }

    fn orchestrator(
        vcs: MockVersionControl,
        generator: MockTextGenerator,
    ) -> CommitOrchestrator<MockVersionControl, MockTextGenerator> {
        let config = SynthesizerConfig::new(Some(SecretString::from("test-key")));
        CommitOrchestrator::new(vcs, MessageSynthesizer::new(generator, config))
    }

    fn git_failure(command: &str) -> CommandError {
        CommandError {
            command: command.to_string(),
            exit_code: Some(128),
            stderr: "fatal: something broke".to_string(),
        }
    }

    /// A repository with staged changes and the given diff
    fn staged_repo(diff: &'static str) -> MockVersionControl {
        let mut vcs = MockVersionControl::new();
        vcs.expect_is_repository().return_const(true);
        vcs.expect_stage_all().times(1).returning(|| Ok(()));
        vcs.expect_staged_changes()
            .times(1)
            .returning(|| Ok(StagedChanges::Present));
        vcs.expect_staged_diff()
            .times(1)
            .returning(move || Ok(diff.to_string()));
        vcs
    }

    #[test]
    fn test_allowed_transitions() {
        use CommitState::*;

        let path = [
            Idle,
            CheckingRepo,
            Staging,
            CheckingDiff,
            Analyzing,
            AwaitingApproval,
            Committing,
            Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?}", pair);
        }

        assert!(AwaitingApproval.can_transition_to(Analyzing));
        assert!(CheckingDiff.can_transition_to(Done));
        assert!(Staging.can_transition_to(Failed));
        assert!(Committing.can_transition_to(Failed));
    }

    #[test]
    fn test_forbidden_transitions() {
        use CommitState::*;

        assert!(!Done.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Idle));
        assert!(!Idle.can_transition_to(Staging));
        assert!(!CheckingRepo.can_transition_to(CheckingDiff));
        assert!(!Analyzing.can_transition_to(Committing));
        assert!(!Analyzing.can_transition_to(Done));
        assert!(Done.is_terminal() && Failed.is_terminal());
        assert!(!AwaitingApproval.is_terminal());
    }

    #[tokio::test]
    async fn test_not_a_repository_aborts_before_staging() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_is_repository().return_const(false);
        vcs.expect_stage_all().never();
        vcs.expect_commit().never();
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let mut ui = ScriptedUi::default();
        let mut orchestrator = orchestrator(vcs, generator);
        let err = orchestrator.run(&mut ui).await.unwrap_err();

        assert!(matches!(err, GitCliError::NotGitRepository));
        assert_eq!(orchestrator.state(), CommitState::Failed);
        assert_eq!(
            ui.states,
            vec![CommitState::CheckingRepo, CommitState::Failed]
        );
    }

    #[tokio::test]
    async fn test_nothing_staged_finishes_without_provider_call() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_is_repository().return_const(true);
        vcs.expect_stage_all().times(1).returning(|| Ok(()));
        vcs.expect_staged_changes()
            .times(1)
            .returning(|| Ok(StagedChanges::None));
        vcs.expect_staged_diff().never();
        vcs.expect_commit().never();
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let mut ui = ScriptedUi::default();
        let mut orchestrator = orchestrator(vcs, generator);
        let outcome = orchestrator.run(&mut ui).await.unwrap();

        assert_eq!(outcome, CommitOutcome::NothingToCommit);
        assert_eq!(orchestrator.state(), CommitState::Done);
        assert_eq!(
            ui.states,
            vec![
                CommitState::CheckingRepo,
                CommitState::Staging,
                CommitState::CheckingDiff,
                CommitState::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_immediate_acceptance_commits_exact_message() {
        let mut vcs = staged_repo("-foo\n+bar");
        vcs.expect_commit()
            .withf(|message| message == "fix: correct foo to bar")
            .times(1)
            .returning(|_| Ok(()));
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .withf(|_, prompt, _| prompt.contains("-foo\n+bar"))
            .times(1)
            .returning(|_, _, _| Ok("fix: correct foo to bar".to_string()));

        let mut ui = ScriptedUi::answering(&[true]);
        let outcome = orchestrator(vcs, generator).run(&mut ui).await.unwrap();

        assert_eq!(
            outcome,
            CommitOutcome::Committed {
                message: "fix: correct foo to bar".to_string()
            }
        );
        assert_eq!(
            ui.states,
            vec![
                CommitState::CheckingRepo,
                CommitState::Staging,
                CommitState::CheckingDiff,
                CommitState::Analyzing,
                CommitState::AwaitingApproval,
                CommitState::Committing,
                CommitState::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_rejections_resynthesize_and_commit_last_candidate() {
        const REJECTIONS: usize = 3;

        let mut vcs = staged_repo("+new line");
        vcs.expect_commit()
            .withf(|message| message == "feat: attempt 4")
            .times(1)
            .returning(|_| Ok(()));
        let mut generator = MockTextGenerator::new();
        let mut calls = 0;
        generator
            .expect_generate()
            .times(REJECTIONS + 1)
            .returning(move |_, _, _| {
                calls += 1;
                Ok(format!("feat: attempt {}", calls))
            });

        let mut answers = vec![false; REJECTIONS];
        answers.push(true);
        let mut ui = ScriptedUi::answering(&answers);
        let outcome = orchestrator(vcs, generator).run(&mut ui).await.unwrap();

        assert_eq!(
            outcome,
            CommitOutcome::Committed {
                message: "feat: attempt 4".to_string()
            }
        );
        assert_eq!(
            ui.shown,
            vec![
                "feat: attempt 1",
                "feat: attempt 2",
                "feat: attempt 3",
                "feat: attempt 4"
            ]
        );
        let approvals = ui
            .states
            .iter()
            .filter(|s| **s == CommitState::AwaitingApproval)
            .count();
        assert_eq!(approvals, REJECTIONS + 1);
    }

    #[tokio::test]
    async fn test_content_block_fails_without_commit() {
        let mut vcs = staged_repo("+something");
        vcs.expect_commit().never();
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().times(1).returning(|_, _, _| {
            Err(GenerationError::Blocked {
                reason: "HARM_CATEGORY_HARASSMENT".to_string(),
            })
        });

        let mut ui = ScriptedUi::default();
        let mut orchestrator = orchestrator(vcs, generator);
        let err = orchestrator.run(&mut ui).await.unwrap_err();

        assert!(matches!(
            err,
            GitCliError::Generation(GenerationError::Blocked { .. })
        ));
        assert!(ui.shown.is_empty());
        assert_eq!(orchestrator.state(), CommitState::Failed);
    }

    #[tokio::test]
    async fn test_missing_key_fails_after_staging_without_commit() {
        let mut vcs = staged_repo("+something");
        vcs.expect_commit().never();
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let synthesizer = MessageSynthesizer::new(generator, SynthesizerConfig::new(None));
        let mut orchestrator = CommitOrchestrator::new(vcs, synthesizer);
        let err = orchestrator
            .run(&mut ScriptedUi::default())
            .await
            .unwrap_err();

        assert!(err.is_missing_api_key());
    }

    #[tokio::test]
    async fn test_empty_diff_after_staged_changes_is_failure() {
        let vcs = {
            let mut vcs = staged_repo("   ");
            vcs.expect_commit().never();
            vcs
        };
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let err = orchestrator(vcs, generator)
            .run(&mut ScriptedUi::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GitCliError::EmptyDiff));
    }

    #[tokio::test]
    async fn test_staging_failure_is_not_retried() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_is_repository().return_const(true);
        vcs.expect_stage_all()
            .times(1)
            .returning(|| Err(git_failure("git add --all")));
        vcs.expect_staged_changes().never();
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let err = orchestrator(vcs, generator)
            .run(&mut ScriptedUi::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GitCliError::Staging(e) if e.exit_code == Some(128)));
    }

    #[tokio::test]
    async fn test_staged_check_error_propagates() {
        let mut vcs = MockVersionControl::new();
        vcs.expect_is_repository().return_const(true);
        vcs.expect_stage_all().returning(|| Ok(()));
        vcs.expect_staged_changes()
            .returning(|| Err(git_failure("git diff --staged --quiet")));
        vcs.expect_staged_diff().never();
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let err = orchestrator(vcs, generator)
            .run(&mut ScriptedUi::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GitCliError::StagedCheck(_)));
    }

    #[tokio::test]
    async fn test_commit_failure_is_reported() {
        let mut vcs = staged_repo("+x");
        vcs.expect_commit()
            .times(1)
            .returning(|_| Err(git_failure("git commit -m \"fix: x\"")));
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _, _| Ok("fix: x".to_string()));

        let mut ui = ScriptedUi::answering(&[true]);
        let mut orchestrator = orchestrator(vcs, generator);
        let err = orchestrator.run(&mut ui).await.unwrap_err();

        assert!(matches!(err, GitCliError::Commit(_)));
        assert_eq!(
            &ui.states[ui.states.len() - 2..],
            &[CommitState::Committing, CommitState::Failed]
        );
    }

    #[tokio::test]
    async fn test_confirmation_error_aborts() {
        struct BrokenUi;

        impl CommitUi for BrokenUi {
            fn enter(&mut self, _state: CommitState) {}

            fn confirm(&mut self, _candidate: &Candidate) -> Result<bool> {
                Err(GitCliError::Prompt("stdin closed".to_string()))
            }
        }

        let mut vcs = staged_repo("+x");
        vcs.expect_commit().never();
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_, _, _| Ok("fix: x".to_string()));

        let err = orchestrator(vcs, generator)
            .run(&mut BrokenUi)
            .await
            .unwrap_err();
        assert!(matches!(err, GitCliError::Prompt(_)));
    }
}
