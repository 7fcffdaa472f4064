//! Local working-tree access using git2.
//!
//! Every operation re-discovers the repository from the working directory;
//! nothing about the repository is cached between calls.

pub mod diff;
pub mod history;
pub mod status;
pub mod types;

pub use types::{FileChange, FileStatus};

use std::path::{Path, PathBuf};

use git2::{Commit, ErrorCode, Repository, Tree};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Current directory is not inside a Git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("No files to diff")]
    NoFilesToDiff,

    #[error("Git operation failed: {0}")]
    Operation(#[from] git2::Error),

    #[error("Failed to resolve working directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

/// Handle on the working tree at (or above) `workdir`.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    workdir: PathBuf,
}

impl LocalRepository {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn current_dir() -> Result<Self, GitError> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn open(&self) -> Result<Repository, GitError> {
        let repo = match Repository::discover(&self.workdir) {
            Ok(repo) => repo,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(GitError::NotARepository(self.workdir.clone()))
            }
            Err(e) => return Err(GitError::Operation(e)),
        };
        if repo.is_bare() {
            return Err(GitError::NotARepository(self.workdir.clone()));
        }
        Ok(repo)
    }
}

/// Resolve the HEAD commit, `None` for a repository without commits.
fn head_commit(repo: &Repository) -> Result<Option<Commit<'_>>, GitError> {
    let head = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::Operation(e)),
    };
    Ok(Some(head.peel_to_commit()?))
}

fn head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    match head_commit(repo)? {
        Some(commit) => Ok(Some(commit.tree()?)),
        None => Ok(None),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::TestRepo;
    use super::*;

    #[test]
    fn test_plain_directory_is_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalRepository::new(dir.path());
        assert!(matches!(local.open(), Err(GitError::NotARepository(_))));
    }

    #[test]
    fn test_repository_is_discovered_from_subdirectory() {
        let test_repo = TestRepo::new();
        test_repo.write("nested/dir/file.txt", "x\n");
        let local = LocalRepository::new(test_repo.dir.path().join("nested/dir"));
        assert!(local.open().is_ok());
    }

    #[test]
    fn test_removed_git_dir_is_detected_on_next_call() {
        let test_repo = TestRepo::new();
        let local = test_repo.local();
        assert!(local.open().is_ok());
        std::fs::remove_dir_all(test_repo.dir.path().join(".git")).unwrap();
        assert!(matches!(local.open(), Err(GitError::NotARepository(_))));
    }

    #[test]
    fn test_head_commit_on_unborn_branch_is_none() {
        let test_repo = TestRepo::new();
        assert!(head_commit(&test_repo.repo).unwrap().is_none());
        assert!(head_tree(&test_repo.repo).unwrap().is_none());
    }
}
