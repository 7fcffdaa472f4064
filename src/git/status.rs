use git2::{Delta, Status, StatusEntry, StatusOptions};
use tracing::{debug, instrument};

use super::types::{FileChange, FileStatus};
use super::{GitError, LocalRepository};

impl LocalRepository {
    /// List every file that differs from HEAD, sorted by filename.
    #[instrument(skip(self), fields(workdir = %self.workdir().display()))]
    pub fn list_changed_files(&self) -> Result<Vec<FileChange>, GitError> {
        let repo = self.open()?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .renames_head_to_index(true);
        let statuses = repo.statuses(Some(&mut opts))?;

        let mut added = Vec::new();
        let mut deleted = Vec::new();
        let mut changed = Vec::new();

        for entry in statuses.iter() {
            let Some(path) = entry_path(&entry) else {
                continue;
            };
            let status = entry.status();
            if status.intersects(Status::INDEX_NEW | Status::WT_NEW) {
                added.push(path);
            } else if status.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
                deleted.push(path);
            } else if status.intersects(
                Status::INDEX_MODIFIED
                    | Status::WT_MODIFIED
                    | Status::INDEX_RENAMED
                    | Status::WT_RENAMED
                    | Status::INDEX_TYPECHANGE
                    | Status::WT_TYPECHANGE
                    | Status::CONFLICTED,
            ) {
                changed.push(path);
            }
        }

        debug!(
            added = added.len(),
            deleted = deleted.len(),
            changed = changed.len(),
            "read working tree status"
        );
        Ok(merge_changes(added, deleted, changed))
    }
}

/// Path to report for a status entry; renames report their destination.
fn entry_path(entry: &StatusEntry<'_>) -> Option<String> {
    [entry.head_to_index(), entry.index_to_workdir()]
        .into_iter()
        .flatten()
        .find(|delta| delta.status() == Delta::Renamed)
        .and_then(|delta| delta.new_file().path().map(|p| p.to_string_lossy().into_owned()))
        .or_else(|| entry.path().map(str::to_string))
}

/// Merge the three status categories into one list sorted by filename.
/// A filename reported in several categories keeps the first one
/// (added, then deleted, then changed).
pub fn merge_changes(
    added: Vec<String>,
    deleted: Vec<String>,
    changed: Vec<String>,
) -> Vec<FileChange> {
    let tag = |names: Vec<String>, status: FileStatus| {
        names
            .into_iter()
            .map(move |name| FileChange::new(name, status))
    };

    let mut changes: Vec<FileChange> = tag(added, FileStatus::Added)
        .chain(tag(deleted, FileStatus::Deleted))
        .chain(tag(changed, FileStatus::Changed))
        .collect();

    changes.sort_by(|a, b| a.filename.cmp(&b.filename));
    changes.dedup_by(|a, b| a.filename == b.filename);
    changes
}
