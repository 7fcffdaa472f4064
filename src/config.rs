use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::diff::{FilterError, IgnorePatterns};

const CONFIG_ENV: &str = "REVU_CONFIG";
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid temperature value {0}. It must be a value between 0 and 2 (inclusive).")]
    InvalidTemperature(f64),

    #[error("Invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },

    #[error(transparent)]
    InvalidPattern(#[from] FilterError),

    #[error("Missing {name}. Run `revu config` or set the {env} environment variable.")]
    MissingCredential {
        name: &'static str,
        env: &'static str,
    },

    #[error("Could not determine the home directory for the config file")]
    NoHomeDirectory,
}

/// Top-level configuration loaded from `~/.revu/revu.toml`.
/// Every field has a default, so the tool works without a file once the
/// credentials are available from the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub git: GitConfig,
    pub github: GitHubConfig,
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Regexes; changed files matching any of them are left out of diffs
    pub ignore_patterns: Vec<String>,
    /// Number of recent commit subjects given as context for commit messages
    pub max_commit_history: usize,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            max_commit_history: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_url: String,
    pub model: String,
    pub temperature: f64,
    /// OpenAI API key. If None, falls back to OPENAI_API_KEY env var.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            api_key: None,
        }
    }
}

impl OpenAiConfig {
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        non_empty(self.api_key.as_deref()).ok_or(ConfigError::MissingCredential {
            name: "OpenAI API key",
            env: OPENAI_API_KEY_ENV,
        })
    }
}

impl GitHubConfig {
    pub fn token(&self) -> Result<&str, ConfigError> {
        non_empty(self.token.as_deref()).ok_or(ConfigError::MissingCredential {
            name: "GitHub token",
            env: GITHUB_TOKEN_ENV,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Sampling temperature accepted by the model API.
pub fn validate_temperature(temperature: f64) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ConfigError::InvalidTemperature(temperature));
    }
    Ok(())
}

impl Config {
    /// Location of the config file: `$REVU_CONFIG`, else `~/.revu/revu.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::home_dir()
            .map(|home| home.join(".revu").join("revu.toml"))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Load and validate the configuration from the default location,
    /// reading the process environment.
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_with(&Self::path()?, |key| std::env::var(key).ok())
    }

    /// Load from `path` with `env` as the environment lookup.
    ///
    /// When the file exists its values are used and only the credentials
    /// fall back to the environment. Without a file, the environment is
    /// layered over the defaults.
    pub fn load_with(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, ConfigError> {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            let mut config = Config::default();
            config.apply_env(&env)?;
            config
        };

        if config.github.token.is_none() {
            config.github.token = env(GITHUB_TOKEN_ENV);
        }
        if config.openai.api_key.is_none() {
            config.openai.api_key = env(OPENAI_API_KEY_ENV);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a specific path without environment or validation.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write the config as TOML, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_temperature(self.openai.temperature)?;
        self.ignore_patterns()?;
        Ok(())
    }

    pub fn ignore_patterns(&self) -> Result<IgnorePatterns, ConfigError> {
        Ok(IgnorePatterns::compile(&self.git.ignore_patterns)?)
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(patterns) = env("GIT_IGNORE_PATTERNS") {
            self.git.ignore_patterns = patterns
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = env("GIT_MAX_COMMIT_HISTORY") {
            self.git.max_commit_history = parse_env("GIT_MAX_COMMIT_HISTORY", &value)?;
        }
        if let Some(url) = env("GITHUB_API_URL") {
            self.github.api_url = url;
        }
        if let Some(url) = env("OPENAI_API_URL") {
            self.openai.api_url = url;
        }
        if let Some(model) = env("OPENAI_MODEL") {
            self.openai.model = model;
        }
        if let Some(value) = env("OPENAI_TEMPERATURE") {
            self.openai.temperature = parse_env("OPENAI_TEMPERATURE", &value)?;
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}
