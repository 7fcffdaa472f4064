use git2::{DiffFormat, DiffOptions};
use tracing::{debug, instrument};

use super::{head_tree, GitError, LocalRepository};
use crate::diff::{Diff, IgnorePatterns};

impl LocalRepository {
    /// Unified diff of HEAD against the working tree, restricted to
    /// `filenames` after dropping those matched by `ignore`.
    ///
    /// Untracked files are included with their full content. On a
    /// repository without commits the diff is taken against the empty tree.
    /// Requesting only unchanged files yields `NoFilesToDiff`.
    #[instrument(skip_all, fields(requested = filenames.len()))]
    pub fn diff_for_files<S: AsRef<str>>(
        &self,
        filenames: &[S],
        ignore: &IgnorePatterns,
    ) -> Result<Diff, GitError> {
        let repo = self.open()?;

        let selected = ignore.filter_filenames(filenames);
        if selected.is_empty() {
            return Err(GitError::NoFilesToDiff);
        }

        let tree = head_tree(&repo)?;
        let mut opts = DiffOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true)
            .disable_pathspec_match(true);
        for name in &selected {
            opts.pathspec(name.as_str());
        }
        let diff = repo.diff_tree_to_workdir_with_index(tree.as_ref(), Some(&mut opts))?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            let origin = line.origin();
            if origin == '+' || origin == '-' || origin == ' ' {
                text.push(origin);
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        let diff = Diff::new(text);
        if diff.is_empty() {
            return Err(GitError::NoFilesToDiff);
        }
        debug!(files = selected.len(), diff_bytes = diff.text.len(), "collected working tree diff");
        Ok(diff)
    }

    /// Diff of every changed file in the working tree.
    pub fn full_working_tree_diff(&self, ignore: &IgnorePatterns) -> Result<Diff, GitError> {
        let filenames: Vec<String> = self
            .list_changed_files()?
            .into_iter()
            .map(|change| change.filename)
            .collect();
        self.diff_for_files(&filenames, ignore)
    }
}
