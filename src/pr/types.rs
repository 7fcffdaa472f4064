use std::fmt;

/// A pull request on a hosted repository, identified as `owner/repo#number`.
/// Built by `PullRequestRef::parse` or `parse_pr_url` in pr/mod.rs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// REST endpoint of this pull request under `api_base`.
    pub fn api_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.number
        )
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
