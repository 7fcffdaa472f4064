pub mod types;

pub use types::PullRequestRef;

use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::diff::{self, Diff, DiffError, IgnorePatterns};

const DIFF_MEDIA_TYPE: &str = "application/vnd.github.diff";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Invalid repository format '{0}'. Please use the format: owner/repo")]
    InvalidRepositoryFormat(String),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("Missing pull request number for '{0}'")]
    MissingNumber(String),

    #[error("Failed to fetch PR diff: {status}")]
    RemoteFetch { status: StatusCode },

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error("No files to diff")]
    NoFilesToDiff,
}

fn owner_repo_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+/[A-Za-z0-9_-]+$").expect("owner/repo pattern is valid")
    })
}

impl PullRequestRef {
    /// Build a reference from an `owner/repo` string and a PR number.
    pub fn parse(owner_repo: &str, number: u64) -> Result<Self, PrError> {
        if !owner_repo_pattern().is_match(owner_repo) {
            return Err(PrError::InvalidRepositoryFormat(owner_repo.to_string()));
        }
        let (owner, repo) = owner_repo
            .split_once('/')
            .ok_or_else(|| PrError::InvalidRepositoryFormat(owner_repo.to_string()))?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }
}

/// Parse a GitHub PR URL into its component parts.
///
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}
pub fn parse_pr_url(url: &str) -> Result<PullRequestRef, PrError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    if parsed.host_str() != Some("github.com") {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(|| PrError::InvalidUrl(url.to_string()))?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(PrError::InvalidUrl(url.to_string()));
    }

    let number = segments[3]
        .parse::<u64>()
        .map_err(|_| PrError::InvalidUrl(url.to_string()))?;

    PullRequestRef::parse(&format!("{}/{}", segments[0], segments[1]), number)
}

/// Resolve the `pr` command's target: `owner/repo` plus a number, or a
/// full pull request URL on its own.
pub fn resolve_target(repository: &str, number: Option<u64>) -> Result<PullRequestRef, PrError> {
    match number {
        Some(number) => PullRequestRef::parse(repository, number),
        None if repository.starts_with("https://") || repository.starts_with("http://") => {
            parse_pr_url(repository)
        }
        None => Err(PrError::MissingNumber(repository.to_string())),
    }
}

/// Fetch a pull request's diff, drop the files matched by `ignore`, and
/// return the remaining files re-serialized as unified diff text.
#[instrument(skip(token, pr, ignore), fields(pr = %pr))]
pub async fn fetch_pull_request_diff(
    api_url: &str,
    token: &str,
    pr: &PullRequestRef,
    ignore: &IgnorePatterns,
) -> Result<Diff, PrError> {
    let client = reqwest::Client::new();
    let url = pr.api_url(api_url);

    debug!(%url, "fetching PR diff from GitHub API");
    let response = client
        .get(&url)
        .header(USER_AGENT, "revu")
        .header(ACCEPT, DIFF_MEDIA_TYPE)
        .bearer_auth(token)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PrError::RemoteFetch { status });
    }

    let diff_text = response.text().await?;
    debug!(diff_bytes = diff_text.len(), "received PR diff");

    let files = diff::parse_diff(&diff_text)?;
    let parsed_files = files.len();
    let kept = ignore.filter_parsed_diff(files);
    debug!(
        parsed_files,
        kept_files = kept.len(),
        additions = kept.iter().map(|f| f.additions()).sum::<usize>(),
        deletions = kept.iter().map(|f| f.deletions()).sum::<usize>(),
        "filtered PR diff"
    );

    if kept.is_empty() {
        return Err(PrError::NoFilesToDiff);
    }

    Ok(Diff::new(diff::serialize_diff(&kept)))
}
