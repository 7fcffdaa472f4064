use std::path::Path;

use tracing::{info, instrument};

use super::CommandError;
use crate::config::Config;
use crate::llm::{ChatModel, OpenAiClient};
use crate::pr::{self, PullRequestRef};
use crate::prompt;
use crate::report::{self, Review};

/// Fetch, filter and review one pull request.
#[instrument(skip_all, fields(pr = %target, model = model.name()))]
pub async fn review_pull_request(
    config: &Config,
    target: &PullRequestRef,
    model: &dyn ChatModel,
) -> Result<Review, CommandError> {
    let token = config.github.token()?;
    let ignore = config.ignore_patterns()?;

    info!("fetching pull request diff");
    let diff = pr::fetch_pull_request_diff(&config.github.api_url, token, target, &ignore).await?;

    info!(diff_bytes = diff.text.len(), "requesting review");
    let text = model.complete(&prompt::review_diff(&diff)).await?;
    Ok(Review::new(target.to_string(), text))
}

pub async fn run(
    config: &Config,
    repository: &str,
    number: Option<u64>,
    output: Option<&Path>,
) -> Result<(), CommandError> {
    let target = pr::resolve_target(repository, number)?;
    let model = OpenAiClient::from_config(&config.openai)?;
    let review = review_pull_request(config, &target, &model).await?;
    report::output(&review, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::FakeModel;
    use crate::config::ConfigError;
    use crate::pr::PrError;
    use crate::report::Verdict;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURE: &str = include_str!("../../tests/fixtures/sample_pr.diff");

    fn config_for(server: &MockServer, patterns: &[&str]) -> Config {
        let mut config = Config::default();
        config.github.api_url = server.uri();
        config.github.token = Some("t0ken".to_string());
        config.git.ignore_patterns = patterns.iter().map(|p| p.to_string()).collect();
        config
    }

    async fn serve_fixture() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/pulls/42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_review_pull_request_sends_filtered_diff() {
        let server = serve_fixture().await;
        let config = config_for(&server, &["^generated/"]);
        let model = FakeModel::replying("📌 src/auth/login.rs\n💡 ok\n\n~ LGTM with suggestions");
        let target = PullRequestRef::parse("org/repo", 42).unwrap();

        let review = review_pull_request(&config, &target, &model).await.unwrap();

        assert_eq!(review.subject, "org/repo#42");
        assert_eq!(review.verdict, Verdict::LgtmWithSuggestions);
        let prompts = model.recorded();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].user().starts_with("Please review the following code changes:\n```\n--- a/src/auth/login.rs"));
        assert!(!prompts[0].user().contains("generated/schema.rs"));
    }

    #[tokio::test]
    async fn test_review_pull_request_without_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let mut config = config_for(&server, &[]);
        config.github.token = None;
        let model = FakeModel::replying("✔ LGTM");
        let target = PullRequestRef::parse("org/repo", 42).unwrap();

        let err = review_pull_request(&config, &target, &model).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Config(ConfigError::MissingCredential { .. })
        ));
        assert!(model.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_review_pull_request_everything_ignored_skips_model() {
        let server = serve_fixture().await;
        let config = config_for(&server, &[".*"]);
        let model = FakeModel::replying("✔ LGTM");
        let target = PullRequestRef::parse("org/repo", 42).unwrap();

        let err = review_pull_request(&config, &target, &model).await.unwrap_err();
        assert!(matches!(err, CommandError::Pr(PrError::NoFilesToDiff)));
        assert!(model.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_bad_repository_before_network() {
        let config = Config::default();
        let err = run(&config, "not-a-repo", Some(1), None).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Pr(PrError::InvalidRepositoryFormat(_))
        ));
    }
}
