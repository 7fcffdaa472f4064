use std::path::{Path, PathBuf};

use dialoguer::Select;
use tracing::{info, instrument};

use super::CommandError;
use crate::config::Config;
use crate::diff::IgnorePatterns;
use crate::files;
use crate::git::LocalRepository;
use crate::llm::{ChatModel, OpenAiClient};
use crate::prompt;
use crate::report::{self, Review};

const LOCAL_CHANGES: &str = "local changes";

/// Review every change in the working tree against HEAD.
#[instrument(skip_all, fields(model = model.name()))]
pub async fn review_local_diff(
    repo: &LocalRepository,
    ignore: &IgnorePatterns,
    model: &dyn ChatModel,
) -> Result<Review, CommandError> {
    let diff = repo.full_working_tree_diff(ignore)?;
    info!(diff_bytes = diff.text.len(), "reviewing local changes");
    let text = model.complete(&prompt::review_diff(&diff)).await?;
    Ok(Review::new(LOCAL_CHANGES, text))
}

/// Review a single file, annotated with line numbers.
#[instrument(skip_all, fields(path = %path.display(), model = model.name()))]
pub async fn review_file(path: &Path, model: &dyn ChatModel) -> Result<Review, CommandError> {
    let content = files::read_file(path)?;
    let numbered = files::number_lines(&content);
    let filename = path.display().to_string();

    info!("reviewing file");
    let text = model.complete(&prompt::review_file(&numbered, &filename)).await?;
    Ok(Review::new(filename, text))
}

fn choose_file(mut matches: Vec<PathBuf>) -> Result<PathBuf, CommandError> {
    if matches.len() == 1 {
        return Ok(matches.remove(0));
    }
    let items: Vec<String> = matches.iter().map(|p| p.display().to_string()).collect();
    let selection = Select::new()
        .with_prompt("Multiple files found, select the one to review")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(matches.swap_remove(selection))
}

pub async fn run(
    config: &Config,
    filename: Option<&str>,
    directory: &Path,
    output: Option<&Path>,
) -> Result<(), CommandError> {
    let model = OpenAiClient::from_config(&config.openai)?;

    let review = match filename {
        Some(needle) => {
            let path = choose_file(files::find_matching_files(directory, needle)?)?;
            review_file(&path, &model).await?
        }
        None => {
            let repo = LocalRepository::current_dir()?;
            review_local_diff(&repo, &config.ignore_patterns()?, &model).await?
        }
    };

    report::output(&review, output)?;
    Ok(())
}
