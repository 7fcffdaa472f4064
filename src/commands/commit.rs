use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use tracing::{info, instrument};

use super::CommandError;
use crate::config::Config;
use crate::diff::IgnorePatterns;
use crate::git::{FileChange, LocalRepository};
use crate::llm::{ChatModel, OpenAiClient};
use crate::prompt;

/// What to do with a generated commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    Commit,
    Replace,
    Skip,
}

/// Changed files split by the user's pick.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub selected: Vec<String>,
    pub unselected: Vec<String>,
}

/// Split `changes` into the entries at `chosen` indices and the rest,
/// keeping the original order. Out-of-range indices are ignored.
pub fn partition_selection(changes: &[FileChange], chosen: &[usize]) -> Selection {
    let mut selection = Selection::default();
    for (i, change) in changes.iter().enumerate() {
        if chosen.contains(&i) {
            selection.selected.push(change.filename.clone());
        } else {
            selection.unselected.push(change.filename.clone());
        }
    }
    selection
}

/// Decisions the commit loop needs from the user.
pub trait CommitPrompter {
    /// Indices into `changes` of the files to commit.
    fn select_files(&mut self, changes: &[FileChange]) -> Result<Vec<usize>, CommandError>;

    fn choose_action(&mut self) -> Result<CommitAction, CommandError>;

    fn replace_message(&mut self, initial: &str) -> Result<String, CommandError>;

    fn continue_committing(&mut self) -> Result<bool, CommandError>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter;

impl CommitPrompter for TerminalPrompter {
    fn select_files(&mut self, changes: &[FileChange]) -> Result<Vec<usize>, CommandError> {
        let items: Vec<String> = changes.iter().map(ToString::to_string).collect();
        Ok(MultiSelect::new()
            .with_prompt("Select the files to commit (space to toggle, enter to confirm)")
            .items(&items)
            .interact()?)
    }

    fn choose_action(&mut self) -> Result<CommitAction, CommandError> {
        let actions = [CommitAction::Commit, CommitAction::Replace, CommitAction::Skip];
        let choice = Select::new()
            .with_prompt("Do you want to commit the message, replace it, or do nothing?")
            .items(&["Commit", "Replace", "Do nothing"])
            .default(0)
            .interact()?;
        Ok(actions[choice])
    }

    fn replace_message(&mut self, initial: &str) -> Result<String, CommandError> {
        Ok(Input::<String>::new()
            .with_prompt("Enter the new commit message")
            .with_initial_text(initial)
            .interact_text()?)
    }

    fn continue_committing(&mut self) -> Result<bool, CommandError> {
        Ok(Confirm::new()
            .with_prompt("Do you want to continue commit?")
            .default(false)
            .interact()?)
    }
}

/// Ask the model for a commit message describing `filenames`, using up to
/// `max_history` recent commit subjects as style context.
#[instrument(skip_all, fields(files = filenames.len(), model = model.name()))]
pub async fn generate_commit_message(
    repo: &LocalRepository,
    filenames: &[String],
    ignore: &IgnorePatterns,
    max_history: usize,
    model: &dyn ChatModel,
) -> Result<String, CommandError> {
    let diff = repo.diff_for_files(filenames, ignore)?;
    let history = repo.commit_history(max_history)?;

    info!(diff_bytes = diff.text.len(), history = history.len(), "generating commit message");
    let message = model.complete(&prompt::commit_message(&diff, &history)).await?;
    Ok(message)
}

/// Repeatedly select files, generate a message and commit, until the user
/// skips, declines to continue, or nothing is left. Returns the number of
/// commits created.
pub async fn commit_loop(
    repo: &LocalRepository,
    config: &Config,
    model: &dyn ChatModel,
    prompter: &mut dyn CommitPrompter,
) -> Result<usize, CommandError> {
    let ignore = config.ignore_patterns()?;
    let mut commits = 0;

    loop {
        let changes = repo.list_changed_files()?;
        if changes.is_empty() {
            println!("No changes to commit.");
            break;
        }

        let chosen = prompter.select_files(&changes)?;
        let selection = partition_selection(&changes, &chosen);
        if selection.selected.is_empty() {
            println!("No files selected.");
            break;
        }

        let generated = generate_commit_message(
            repo,
            &selection.selected,
            &ignore,
            config.git.max_commit_history,
            model,
        )
        .await?;
        println!();
        println!("{}", generated.bold());
        println!();

        let message = match prompter.choose_action()? {
            CommitAction::Skip => break,
            CommitAction::Commit => generated,
            CommitAction::Replace => {
                let replaced = prompter.replace_message(&generated)?;
                if replaced.trim().is_empty() {
                    return Err(CommandError::EmptyCommitMessage);
                }
                replaced
            }
        };

        let oid = repo.commit(&message, &selection.selected)?;
        commits += 1;
        println!("{} {}", "Committed".green(), oid);

        if selection.unselected.is_empty() || !prompter.continue_committing()? {
            break;
        }
    }

    Ok(commits)
}

pub async fn run(config: &Config) -> Result<(), CommandError> {
    let repo = LocalRepository::current_dir()?;
    let model = OpenAiClient::from_config(&config.openai)?;
    commit_loop(&repo, config, &model, &mut TerminalPrompter).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::FakeModel;
    use crate::git::test_support::TestRepo;
    use crate::git::{FileStatus, GitError};
    use std::collections::VecDeque;

    #[derive(Default)]
    struct ScriptedPrompter {
        selections: VecDeque<Vec<usize>>,
        actions: VecDeque<CommitAction>,
        replacement: String,
        continues: VecDeque<bool>,
        offered: Vec<Vec<String>>,
    }

    impl CommitPrompter for ScriptedPrompter {
        fn select_files(&mut self, changes: &[FileChange]) -> Result<Vec<usize>, CommandError> {
            self.offered
                .push(changes.iter().map(|c| c.filename.clone()).collect());
            Ok(self.selections.pop_front().unwrap_or_default())
        }

        fn choose_action(&mut self) -> Result<CommitAction, CommandError> {
            Ok(self.actions.pop_front().unwrap_or(CommitAction::Skip))
        }

        fn replace_message(&mut self, _initial: &str) -> Result<String, CommandError> {
            Ok(self.replacement.clone())
        }

        fn continue_committing(&mut self) -> Result<bool, CommandError> {
            Ok(self.continues.pop_front().unwrap_or(false))
        }
    }

    fn head_message(test_repo: &TestRepo) -> String {
        let head = test_repo.repo.head().unwrap().peel_to_commit().unwrap();
        head.message().unwrap().to_string()
    }

    /// One committed file modified plus one untracked file.
    fn repo_with_two_changes() -> TestRepo {
        let test_repo = TestRepo::new();
        test_repo.write("a.rs", "fn a() {}\n");
        test_repo.commit_all("Initial commit");
        test_repo.write("a.rs", "fn a() { todo!() }\n");
        test_repo.write("b.rs", "fn b() {}\n");
        test_repo
    }

    #[test]
    fn test_partition_selection() {
        let changes = vec![
            FileChange::new("a.rs", FileStatus::Changed),
            FileChange::new("b.rs", FileStatus::Added),
            FileChange::new("c.rs", FileStatus::Deleted),
        ];
        let selection = partition_selection(&changes, &[2, 0, 9]);
        assert_eq!(selection.selected, vec!["a.rs", "c.rs"]);
        assert_eq!(selection.unselected, vec!["b.rs"]);
    }

    #[tokio::test]
    async fn test_generate_commit_message_includes_history_and_diff() {
        let test_repo = repo_with_two_changes();
        let model = FakeModel::replying("Stub out a");

        let message = generate_commit_message(
            &test_repo.local(),
            &["a.rs".to_string()],
            &IgnorePatterns::default(),
            10,
            &model,
        )
        .await
        .unwrap();

        assert_eq!(message, "Stub out a");
        let prompt = &model.recorded()[0];
        assert!(prompt.system().ends_with("```\nInitial commit\n```"));
        assert!(prompt.user().contains("+fn a() { todo!() }"));
        assert!(!prompt.user().contains("b.rs"));
    }

    #[tokio::test]
    async fn test_generate_commit_message_without_history() {
        let test_repo = repo_with_two_changes();
        let model = FakeModel::replying("Add b");
        generate_commit_message(
            &test_repo.local(),
            &["b.rs".to_string()],
            &IgnorePatterns::default(),
            0,
            &model,
        )
        .await
        .unwrap();
        assert!(!model.recorded()[0].system().contains("Initial commit"));
    }

    #[tokio::test]
    async fn test_commit_loop_commits_selected_file_only() {
        let test_repo = repo_with_two_changes();
        let model = FakeModel::replying("Stub out a");
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([vec![0]]),
            actions: VecDeque::from([CommitAction::Commit]),
            continues: VecDeque::from([false]),
            ..Default::default()
        };

        let commits = commit_loop(&test_repo.local(), &Config::default(), &model, &mut prompter)
            .await
            .unwrap();

        assert_eq!(commits, 1);
        assert_eq!(head_message(&test_repo), "Stub out a");
        assert!(!test_repo.is_tracked("b.rs"));
        assert_eq!(prompter.offered, vec![vec!["a.rs".to_string(), "b.rs".to_string()]]);
    }

    #[tokio::test]
    async fn test_commit_loop_replace_uses_edited_message() {
        let test_repo = repo_with_two_changes();
        let model = FakeModel::replying("Stub out a");
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([vec![0, 1]]),
            actions: VecDeque::from([CommitAction::Replace]),
            replacement: "Rework a and add b".to_string(),
            ..Default::default()
        };

        let commits = commit_loop(&test_repo.local(), &Config::default(), &model, &mut prompter)
            .await
            .unwrap();

        assert_eq!(commits, 1);
        assert_eq!(head_message(&test_repo), "Rework a and add b");
        assert!(test_repo.is_tracked("b.rs"));
    }

    #[tokio::test]
    async fn test_commit_loop_empty_replacement_fails_without_commit() {
        let test_repo = repo_with_two_changes();
        let model = FakeModel::replying("Stub out a");
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([vec![0]]),
            actions: VecDeque::from([CommitAction::Replace]),
            replacement: "   ".to_string(),
            ..Default::default()
        };

        let err = commit_loop(&test_repo.local(), &Config::default(), &model, &mut prompter)
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::EmptyCommitMessage));
        assert_eq!(head_message(&test_repo), "Initial commit");
    }

    #[tokio::test]
    async fn test_commit_loop_skip_creates_nothing() {
        let test_repo = repo_with_two_changes();
        let model = FakeModel::replying("Stub out a");
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([vec![0]]),
            actions: VecDeque::from([CommitAction::Skip]),
            ..Default::default()
        };

        let commits = commit_loop(&test_repo.local(), &Config::default(), &model, &mut prompter)
            .await
            .unwrap();
        assert_eq!(commits, 0);
        assert_eq!(head_message(&test_repo), "Initial commit");
    }

    #[tokio::test]
    async fn test_commit_loop_continues_until_everything_is_committed() {
        let test_repo = repo_with_two_changes();
        let model = FakeModel::replying("Update files");
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([vec![1], vec![0]]),
            actions: VecDeque::from([CommitAction::Commit, CommitAction::Commit]),
            continues: VecDeque::from([true]),
            ..Default::default()
        };

        let commits = commit_loop(&test_repo.local(), &Config::default(), &model, &mut prompter)
            .await
            .unwrap();

        assert_eq!(commits, 2);
        assert_eq!(
            prompter.offered,
            vec![
                vec!["a.rs".to_string(), "b.rs".to_string()],
                vec!["a.rs".to_string()],
            ]
        );
        assert!(test_repo.local().list_changed_files().unwrap().is_empty());
        let second_prompt = &model.recorded()[1];
        assert!(second_prompt.system().contains("```\nUpdate files\nInitial commit\n```"));
    }

    #[tokio::test]
    async fn test_commit_loop_clean_tree_prompts_nothing() {
        let test_repo = TestRepo::new();
        test_repo.write("a.rs", "fn a() {}\n");
        test_repo.commit_all("Initial commit");
        let model = FakeModel::replying("unused");
        let mut prompter = ScriptedPrompter::default();

        let commits = commit_loop(&test_repo.local(), &Config::default(), &model, &mut prompter)
            .await
            .unwrap();
        assert_eq!(commits, 0);
        assert!(prompter.offered.is_empty());
        assert!(model.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_commit_loop_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let model = FakeModel::replying("unused");
        let err = commit_loop(
            &LocalRepository::new(dir.path()),
            &Config::default(),
            &model,
            &mut ScriptedPrompter::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommandError::Git(GitError::NotARepository(_))));
    }
}
