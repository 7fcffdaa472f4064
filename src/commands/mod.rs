//! Subcommand pipelines.
//!
//! Each command has a pure pipeline taking a `&dyn ChatModel` and already
//! resolved inputs, plus a `run` entry point that wires configuration,
//! terminal prompts and output around it.

pub mod commit;
pub mod config;
pub mod local;
pub mod pr;

use thiserror::Error;

use crate::config::ConfigError;
use crate::files::FileError;
use crate::git::GitError;
use crate::llm::ModelError;
use crate::pr::PrError;
use crate::report::ReportError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Pr(#[from] PrError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    File(#[from] FileError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Prompt failed: {0}")]
    Dialog(#[from] dialoguer::Error),

    #[error("Commit message is required")]
    EmptyCommitMessage,
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm::{ChatModel, ModelError};
    use crate::prompt::Prompt;

    /// Model double that returns a canned reply and records every prompt.
    pub struct FakeModel {
        reply: Option<String>,
        pub prompts: Mutex<Vec<Prompt>>,
    }

    impl FakeModel {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// A model that always comes back without content.
        pub fn empty() -> Self {
            Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn recorded(&self) -> Vec<Prompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for FakeModel {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(&self, prompt: &Prompt) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            self.reply.clone().ok_or(ModelError::EmptyResponse)
        }
    }
}
