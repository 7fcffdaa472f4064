use std::path::Path;

use git2::{Oid, Sort};
use tracing::{debug, info, instrument};

use super::{head_commit, GitError, LocalRepository};

impl LocalRepository {
    /// Subjects of at most `max_entries` commits reachable from HEAD,
    /// newest first. Empty when the repository has no commits.
    #[instrument(skip(self))]
    pub fn commit_history(&self, max_entries: usize) -> Result<Vec<String>, GitError> {
        let repo = self.open()?;
        if max_entries == 0 {
            return Ok(Vec::new());
        }
        let Some(head) = head_commit(&repo)? else {
            return Ok(Vec::new());
        };

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(head.id())?;

        let mut subjects = Vec::with_capacity(max_entries);
        for oid in revwalk.take(max_entries) {
            let commit = repo.find_commit(oid?)?;
            subjects.push(commit.summary().unwrap_or_default().to_string());
        }
        debug!(commits = subjects.len(), "read commit history");
        Ok(subjects)
    }

    /// Stage exactly `filenames` and commit the index with `message`.
    ///
    /// Files missing from the working tree are staged as deletions. If the
    /// commit step fails after staging, the index is left staged. The commit
    /// records the whole index, so changes staged earlier outside `filenames`
    /// are committed too.
    #[instrument(skip_all, fields(files = filenames.len()))]
    pub fn commit<S: AsRef<str>>(&self, message: &str, filenames: &[S]) -> Result<Oid, GitError> {
        let repo = self.open()?;
        let root = repo
            .workdir()
            .ok_or_else(|| GitError::NotARepository(self.workdir().to_path_buf()))?
            .to_path_buf();

        let mut index = repo.index()?;
        for name in filenames {
            let path = Path::new(name.as_ref());
            if root.join(path).exists() {
                index.add_path(path)?;
            } else {
                index.remove_path(path)?;
            }
        }
        index.write()?;

        let tree = repo.find_tree(index.write_tree()?)?;
        let signature = repo.signature()?;
        let parent = head_commit(&repo)?;
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        info!(%oid, "created commit");
        Ok(oid)
    }
}
