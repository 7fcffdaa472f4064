use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Error)]
pub enum FileError {
    #[error("No files matching '{needle}' found in {}", .directory.display())]
    NotFound { needle: String, directory: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Find regular files under `directory` whose file name contains `needle`.
///
/// Hidden files and directories (including `.git`) are skipped. Results are
/// sorted so interactive pick lists are stable.
pub fn find_matching_files(directory: &Path, needle: &str) -> Result<Vec<PathBuf>, FileError> {
    let mut matches = Vec::new();
    for entry in WalkDir::new(directory).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().contains(needle) {
            matches.push(entry.into_path());
        }
    }
    matches.sort();
    debug!(needle, directory = %directory.display(), found = matches.len(), "searched for files");

    if matches.is_empty() {
        return Err(FileError::NotFound {
            needle: needle.to_string(),
            directory: directory.to_path_buf(),
        });
    }
    Ok(matches)
}

pub fn read_file(path: &Path) -> Result<String, FileError> {
    fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Prefix every line with its 1-based number, `"{n} | {line}"`.
pub fn number_lines(content: &str) -> String {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{} | {}", i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}
