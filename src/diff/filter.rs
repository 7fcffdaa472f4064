use regex::Regex;
use thiserror::Error;

use super::types::ParsedFile;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Compiled ignore patterns. A path is ignored if any pattern matches
/// anywhere in it; an empty set ignores nothing.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<Regex>,
}

impl IgnorePatterns {
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> Result<Self, FilterError> {
        let patterns = sources
            .iter()
            .map(|source| {
                let source = source.as_ref();
                Regex::new(source).map_err(|e| FilterError::InvalidPattern {
                    pattern: source.to_string(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }

    /// Keep the filenames no pattern matches, in input order.
    pub fn filter_filenames<S: AsRef<str>>(&self, filenames: &[S]) -> Vec<String> {
        filenames
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.is_ignored(name))
            .map(str::to_string)
            .collect()
    }

    /// Keep the files whose old and new paths both escape every pattern.
    /// An absent side (added or deleted file) never matches.
    pub fn filter_parsed_diff(&self, files: Vec<ParsedFile>) -> Vec<ParsedFile> {
        if self.is_empty() {
            return files;
        }
        files
            .into_iter()
            .filter(|file| {
                let old_ignored = file.old_path().is_some_and(|p| self.is_ignored(p));
                let new_ignored = file.new_path().is_some_and(|p| self.is_ignored(p));
                !old_ignored && !new_ignored
            })
            .collect()
    }
}
