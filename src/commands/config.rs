use std::path::Path;

use colored::Colorize;
use dialoguer::Password;
use tracing::info;

use super::CommandError;
use crate::config::Config;

/// Store both credentials in `config`, keeping every other setting.
pub fn apply_credentials(config: &mut Config, github_token: String, openai_api_key: String) {
    config.github.token = Some(github_token.trim().to_string());
    config.openai.api_key = Some(openai_api_key.trim().to_string());
}

/// Load the existing file when there is one, otherwise start from defaults.
fn existing_or_default(path: &Path) -> Result<Config, CommandError> {
    if path.exists() {
        Ok(Config::load_from(path)?)
    } else {
        Ok(Config::default())
    }
}

fn ask_secret(prompt: &str) -> Result<String, CommandError> {
    Ok(Password::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("A value is required")
            } else {
                Ok(())
            }
        })
        .interact()?)
}

pub fn run() -> Result<(), CommandError> {
    let path = Config::path()?;
    let mut config = existing_or_default(&path)?;

    let github_token = ask_secret("GitHub token")?;
    let openai_api_key = ask_secret("OpenAI API key")?;
    apply_credentials(&mut config, github_token, openai_api_key);

    config.save(&path)?;
    info!(path = %path.display(), "saved configuration");
    println!("{} {}", "Configuration saved to".green(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_credentials_keeps_other_settings() {
        let mut config = Config::default();
        config.openai.model = "gpt-4o".to_string();
        apply_credentials(&mut config, " ghp-abc ".to_string(), "sk-abc\n".to_string());

        assert_eq!(config.github.token().unwrap(), "ghp-abc");
        assert_eq!(config.openai.api_key().unwrap(), "sk-abc");
        assert_eq!(config.openai.model, "gpt-4o");
    }

    #[test]
    fn test_existing_config_is_merged_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revu.toml");
        std::fs::write(&path, "[git]\nignore_patterns = [\"^dist/\"]\n").unwrap();

        let mut config = existing_or_default(&path).unwrap();
        apply_credentials(&mut config, "ghp".to_string(), "sk".to_string());
        config.save(&path).unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.git.ignore_patterns, vec!["^dist/"]);
        assert_eq!(saved.github.token.as_deref(), Some("ghp"));
    }

    #[test]
    fn test_missing_config_starts_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = existing_or_default(&dir.path().join("none.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
