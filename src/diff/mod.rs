pub mod filter;
pub mod types;

pub use filter::{FilterError, IgnorePatterns};
pub use types::{ChangeLine, Diff, Hunk, LineKind, ParsedFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Failed to parse diff: {0}")]
    Parse(String),
}

/// Hunk being filled, with the number of old/new lines its header still expects.
struct OpenHunk {
    hunk: Hunk,
    old_remaining: usize,
    new_remaining: usize,
}

impl OpenHunk {
    fn accepts(&self, line: &str) -> bool {
        match line.as_bytes().first() {
            Some(b'+') => self.new_remaining > 0,
            Some(b'-') => self.old_remaining > 0,
            Some(b' ') | None => self.old_remaining > 0 && self.new_remaining > 0,
            _ => false,
        }
    }

    fn push(&mut self, line: &str) {
        let (kind, content) = match line.as_bytes().first() {
            Some(b'+') => (LineKind::Add, &line[1..]),
            Some(b'-') => (LineKind::Delete, &line[1..]),
            Some(b' ') => (LineKind::Context, &line[1..]),
            _ => (LineKind::Context, ""),
        };
        match kind {
            LineKind::Add => self.new_remaining -= 1,
            LineKind::Delete => self.old_remaining -= 1,
            LineKind::Context => {
                self.old_remaining -= 1;
                self.new_remaining -= 1;
            }
        }
        self.hunk.lines.push(ChangeLine {
            kind,
            content: content.to_string(),
        });
    }

    fn is_complete(&self) -> bool {
        self.old_remaining == 0 && self.new_remaining == 0
    }
}

/// Parse a unified diff string into a vector of ParsedFile structs.
///
/// Accepts both `diff --git` framed input (as served by GitHub) and bare
/// `--- `/`+++ ` framed input (as produced by [`serialize_diff`]). Hunk bodies
/// are consumed according to their header counts, so a removed line that
/// starts with `--` is never read as a file header.
pub fn parse_diff(raw_diff: &str) -> Result<Vec<ParsedFile>, DiffError> {
    if raw_diff.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut current_file: Option<ParsedFile> = None;
    let mut current_hunk: Option<OpenHunk> = None;
    let mut saw_from_header = false;

    let finish_hunk = |file: &mut Option<ParsedFile>, hunk: &mut Option<OpenHunk>| {
        if let (Some(file), Some(open)) = (file.as_mut(), hunk.take()) {
            file.hunks.push(open.hunk);
        }
    };

    let finish_file = |files: &mut Vec<ParsedFile>,
                       file: &mut Option<ParsedFile>,
                       hunk: &mut Option<OpenHunk>| {
        finish_hunk(file, hunk);
        if let Some(file) = file.take() {
            files.push(file);
        }
    };

    // Split on '\n' only so CRLF content keeps its '\r'.
    let body = raw_diff.strip_suffix('\n').unwrap_or(raw_diff);
    for line in body.split('\n') {
        if let Some(open) = current_hunk.as_mut() {
            // "\ No newline at end of file" can sit between a hunk's lines.
            if line.starts_with('\\') {
                continue;
            }
            if open.accepts(line) {
                open.push(line);
                if open.is_complete() {
                    finish_hunk(&mut current_file, &mut current_hunk);
                }
                continue;
            }
            finish_hunk(&mut current_file, &mut current_hunk);
        }

        // "\ No newline at end of file"
        if line.starts_with('\\') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("diff --git ") {
            finish_file(&mut files, &mut current_file, &mut current_hunk);
            let mut parts = rest.split_whitespace();
            let a_path = parts
                .next()
                .ok_or_else(|| DiffError::Parse("Missing a/ path in diff header".to_string()))?;
            let b_path = parts
                .next()
                .ok_or_else(|| DiffError::Parse("Missing b/ path in diff header".to_string()))?;
            current_file = Some(ParsedFile {
                from_path: a_path.to_string(),
                to_path: b_path.to_string(),
                hunks: Vec::new(),
            });
            saw_from_header = false;
            continue;
        }

        if let Some(rest) = line.strip_prefix("--- ") {
            let path = header_path(rest);
            let completes_git_header =
                !saw_from_header && current_file.as_ref().is_some_and(|f| f.hunks.is_empty());
            if completes_git_header {
                if let Some(file) = current_file.as_mut() {
                    file.from_path = path;
                }
            } else {
                finish_file(&mut files, &mut current_file, &mut current_hunk);
                current_file = Some(ParsedFile {
                    from_path: path.clone(),
                    to_path: path,
                    hunks: Vec::new(),
                });
            }
            saw_from_header = true;
            continue;
        }

        if let Some(rest) = line.strip_prefix("+++ ") {
            let file = current_file
                .as_mut()
                .ok_or_else(|| DiffError::Parse("'+++' header without a file".to_string()))?;
            file.to_path = header_path(rest);
            continue;
        }

        if line.starts_with("@@") {
            if current_file.is_none() {
                return Err(DiffError::Parse(format!("Hunk outside of a file: {}", line)));
            }
            let (old_start, old_lines, new_start, new_lines) = parse_hunk_header(line)?;
            let open = OpenHunk {
                hunk: Hunk {
                    old_start,
                    old_lines,
                    new_start,
                    new_lines,
                    lines: Vec::new(),
                },
                old_remaining: old_lines,
                new_remaining: new_lines,
            };
            let complete = open.is_complete();
            current_hunk = Some(open);
            if complete {
                finish_hunk(&mut current_file, &mut current_hunk);
            }
        }
    }

    finish_file(&mut files, &mut current_file, &mut current_hunk);
    Ok(files)
}

/// Render parsed files back into unified diff text.
///
/// Each file is `--- {from}\n+++ {to}\n` followed by its hunks; hunks and
/// files are separated by a blank line. Every change line is its marker
/// character directly followed by its content.
pub fn serialize_diff(files: &[ParsedFile]) -> String {
    files
        .iter()
        .map(serialize_file)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn serialize_file(file: &ParsedFile) -> String {
    let hunks = file
        .hunks
        .iter()
        .map(serialize_hunk)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("--- {}\n+++ {}\n{}", file.from_path, file.to_path, hunks)
}

fn serialize_hunk(hunk: &Hunk) -> String {
    let body = hunk
        .lines
        .iter()
        .map(|line| format!("{}{}", line.kind.marker(), line.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "@@ -{},{} +{},{} @@\n{}",
        hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines, body
    )
}

/// Header path without a trailing timestamp (`--- a/x\t2024-01-01 ...`).
fn header_path(rest: &str) -> String {
    rest.split('\t').next().unwrap_or(rest).trim_end().to_string()
}

fn parse_hunk_header(line: &str) -> Result<(usize, usize, usize, usize), DiffError> {
    let header = line
        .strip_prefix("@@")
        .ok_or_else(|| DiffError::Parse("Invalid hunk header".to_string()))?;
    // Anything after the closing "@@" is a section heading.
    let ranges = header.split("@@").next().unwrap_or(header).trim();
    let mut parts = ranges.split_whitespace();
    let old_part = parts
        .next()
        .ok_or_else(|| DiffError::Parse("Missing old range".to_string()))?;
    let new_part = parts
        .next()
        .ok_or_else(|| DiffError::Parse("Missing new range".to_string()))?;

    let (old_start, old_count) = parse_range(old_part, '-')?;
    let (new_start, new_count) = parse_range(new_part, '+')?;

    Ok((old_start, old_count, new_start, new_count))
}

fn parse_range(part: &str, prefix: char) -> Result<(usize, usize), DiffError> {
    let range = part
        .strip_prefix(prefix)
        .ok_or_else(|| DiffError::Parse("Invalid range prefix".to_string()))?;
    let (start_str, count_str) = match range.split_once(',') {
        Some((start, count)) => (start, count),
        None => (range, "1"),
    };
    let start = start_str
        .parse::<usize>()
        .map_err(|_| DiffError::Parse(format!("Invalid range start in {}", part)))?;
    let count = count_str
        .parse::<usize>()
        .map_err(|_| DiffError::Parse(format!("Invalid range count in {}", part)))?;
    Ok((start, count))
}
