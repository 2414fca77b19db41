//! Prompt templates for AI generation

/// Commit types the model may choose from
pub const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "build", "chore", "ci", "docs", "style", "refactor", "perf", "test",
];

/// Generate the prompt for commit message generation
pub fn commit_message_prompt(diff: &str) -> String {
    let types = COMMIT_TYPES.join(", ");
    format!(
        r#"Analyze the following git diff and write a concise, informative commit message that follows the Conventional Commits specification (https://www.conventionalcommits.org/).

The commit message MUST be a single line in the format: <type>[optional scope]: <description>

Requirements:
1. Types: {types}. Pick the one that fits best.
2. The scope is optional and names the affected part of the codebase (e.g. 'auth', 'ui', 'parser').
3. The description starts with a lowercase letter, summarizes the change succinctly and does not end with a period.
4. Describe what the change means, not which files it touches. Be specific but brief.

Respond ONLY with the single-line commit message. Do not add explanations, backticks or any other formatting.

Git Diff:
```diff
{diff}
```

Commit Message:"#
    )
}
