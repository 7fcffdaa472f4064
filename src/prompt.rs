//! Instruction payloads sent to the model, one builder per workflow.

use std::path::Path;

use crate::diff::Diff;

/// Status markers the review prompts require at the end of a review.
pub const LGTM: &str = "✔ LGTM";
pub const CHANGES_REQUIRED: &str = "✘ Change(s) required";
pub const LGTM_WITH_SUGGESTIONS: &str = "~ LGTM with suggestions";

const REVIEW_DIFF_CONTEXT: &str = "Your objective is to meticulously review a diff from a git repository and \
identify any requisite alterations to guarantee that the code is efficient, maintainable, and secure. \
Your assessment must be precise and detailed, only proposing changes that will enhance or repair the code. \
It is imperative to accurately pinpoint the exact location in the code that necessitates modification and \
explicitly specify the necessary changes. Refrain from suggesting comments or purely stylistic changes and \
provide an overall status at the conclusion of your evaluation. If no changes are necessary, state \
\"✔ LGTM\" at the end of your feedback. If modifications are required, state \"✘ Change(s) required\" \
at the end of your feedback. If you have suggestions, state \"~ LGTM with suggestions\" at the end of \
your feedback. When recommending modifications or improvements, please adhere to the following format:";

const REVIEW_DIFF_FORMAT: &str = "📌 {filename}\n💡 {suggestion}";

const REVIEW_FILE_CONTEXT: &str = "As an expert code reviewer, your main duty is to ensure that the code conforms \
to the highest standards of efficiency, maintainability, and security. To accomplish this, you must provide \
clear and precise feedback that identifies the exact line number where changes are necessary and specifies \
what needs to be altered. It is crucial to avoid suggesting modifications that do not improve or fix the \
code and to refrain from making comments that do not contribute to the code's improvement or error \
correction. At the conclusion of your review, you must explicitly state the overall status of the code, \
using one of the following three options: \"✔ LGTM\" for code that is ready for use, \"✘ Change(s) \
required\" for code that requires improvements, or \"~ LGTM with suggestions\" for code that is mostly \
acceptable but could benefit from some minor adjustments.";

const REVIEW_FILE_FORMAT: &str =
    "Your feedback should be formatted in the following way:\n\n💡 Line {line number}: {suggestion}";

const COMMIT_CONTEXT: &str = "As an experienced code reviewer, your task is to identify the most appropriate \
commit description by analyzing the diff. Your objective is to produce a concise and precise commit \
description with a maximum length of 40 characters. Please note that your response should only include \
the commit description, without any preamble.";

const COMMIT_HISTORY_INTRO: &str =
    "Match the style and tone of the recent commit history, which is as follows:";

/// System and user messages for one model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    system: String,
    user: String,
}

impl Prompt {
    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

/// Review prompt for a unified diff (local changes or a pull request).
pub fn review_diff(diff: &Diff) -> Prompt {
    Prompt {
        system: format!("{REVIEW_DIFF_CONTEXT}\n\n{REVIEW_DIFF_FORMAT}"),
        user: format!("Please review the following code changes:\n```\n{diff}\n```"),
    }
}

/// Review prompt for the content of a single file. The content is usually
/// pre-annotated with line numbers so suggestions can reference them.
pub fn review_file(content: &str, filename: &str) -> Prompt {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    Prompt {
        system: format!("{REVIEW_FILE_CONTEXT}\n\n{REVIEW_FILE_FORMAT}"),
        user: format!("Please review the following file:\n```{extension}\n{content}\n```"),
    }
}

/// Commit message prompt; recent subjects, when present, set the tone.
pub fn commit_message(diff: &Diff, history: &[String]) -> Prompt {
    let system = if history.is_empty() {
        COMMIT_CONTEXT.to_string()
    } else {
        format!(
            "{COMMIT_CONTEXT} {COMMIT_HISTORY_INTRO}\n```\n{}\n```",
            history.join("\n")
        )
    };

    Prompt {
        system,
        user: format!(
            "Please generate the perfect commit description for the following code changes:\n```\n{diff}\n```"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_diff_prompt() {
        let prompt = review_diff(&Diff::new("+fn added() {}"));
        assert!(prompt.system().ends_with(":\n\n📌 {filename}\n💡 {suggestion}"));
        for marker in [LGTM, CHANGES_REQUIRED, LGTM_WITH_SUGGESTIONS] {
            assert!(prompt.system().contains(marker), "missing {marker}");
        }
        assert_eq!(
            prompt.user(),
            "Please review the following code changes:\n```\n+fn added() {}\n```"
        );
    }

    #[test]
    fn test_review_file_prompt_uses_extension_fence() {
        let prompt = review_file("1 | fn main() {}", "src/main.rs");
        assert!(prompt.system().ends_with("💡 Line {line number}: {suggestion}"));
        assert!(prompt.system().contains(LGTM_WITH_SUGGESTIONS));
        assert_eq!(
            prompt.user(),
            "Please review the following file:\n```rs\n1 | fn main() {}\n```"
        );
    }

    #[test]
    fn test_review_file_prompt_without_extension() {
        let prompt = review_file("1 | all:", "Makefile");
        assert_eq!(prompt.user(), "Please review the following file:\n```\n1 | all:\n```");
    }

    #[test]
    fn test_commit_prompt_with_history() {
        let history = vec!["Add login flow".to_string(), "Fix typo".to_string()];
        let prompt = commit_message(&Diff::new("+x"), &history);
        assert_eq!(
            prompt.system(),
            format!("{COMMIT_CONTEXT} {COMMIT_HISTORY_INTRO}\n```\nAdd login flow\nFix typo\n```")
        );
        assert!(prompt.system().contains("maximum length of 40 characters"));
        assert_eq!(
            prompt.user(),
            "Please generate the perfect commit description for the following code changes:\n```\n+x\n```"
        );
    }

    #[test]
    fn test_commit_prompt_without_history() {
        let prompt = commit_message(&Diff::new("+x"), &[]);
        assert_eq!(prompt.system(), COMMIT_CONTEXT);
        assert!(!prompt.system().contains("```"));
    }

    #[test]
    fn test_prompts_are_deterministic() {
        let diff = Diff::new("-a\n+b");
        assert_eq!(review_diff(&diff), review_diff(&diff));
    }
}
