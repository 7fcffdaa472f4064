mod commands;
mod config;
mod diff;
mod files;
mod git;
mod llm;
mod pr;
mod prompt;
mod report;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::CommandError;

/// revu: commit messages and code reviews from an LLM, for local changes,
/// single files, and GitHub pull requests.
#[derive(Parser, Debug)]
#[command(name = "revu", version, about)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the GitHub token and OpenAI API key in the config file
    Config,

    /// Review a GitHub pull request
    Pr {
        /// Repository as owner/repo, or a full pull request URL
        repository: String,

        /// Pull request number (omit when passing a URL)
        pull_request: Option<u64>,

        /// Write the review as markdown to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Review local changes, or a single file with --filename
    Local {
        /// Review the file whose name contains this text
        #[arg(short, long)]
        filename: Option<String>,

        /// Directory to search for --filename
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Write the review as markdown to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate commit messages for selected changes and commit them
    Commit,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), CommandError> {
    match command {
        Command::Config => commands::config::run(),
        Command::Pr {
            repository,
            pull_request,
            output,
        } => {
            let config = load_config()?;
            commands::pr::run(&config, &repository, pull_request, output.as_deref()).await
        }
        Command::Local {
            filename,
            directory,
            output,
        } => {
            let config = load_config()?;
            commands::local::run(&config, filename.as_deref(), &directory, output.as_deref()).await
        }
        Command::Commit => commands::commit::run(&load_config()?).await,
    }
}

fn load_config() -> Result<config::Config, CommandError> {
    let config = config::Config::load()?;
    debug!(model = %config.openai.model, github_api = %config.github.api_url, "loaded configuration");
    Ok(config)
}
