use std::fmt;

/// Path written in a unified diff header for a side that does not exist.
pub const DEV_NULL: &str = "/dev/null";

/// Text handed to the prompt builders: a unified diff from git, a diff
/// rebuilt from parsed hunks, or plain file content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub text: String,
}

impl Diff {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Kind of a single line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Add,
    Delete,
}

impl LineKind {
    /// Leading marker character used in unified diff text.
    pub fn marker(self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Add => '+',
            LineKind::Delete => '-',
        }
    }
}

/// One line of a hunk, without its leading marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLine {
    pub kind: LineKind,
    pub content: String,
}

/// A contiguous region of changes within a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Starting line number in the old file
    pub old_start: usize,
    /// Number of lines in the old file
    pub old_lines: usize,
    /// Starting line number in the new file
    pub new_start: usize,
    /// Number of lines in the new file
    pub new_lines: usize,
    pub lines: Vec<ChangeLine>,
}

/// A single file within a parsed diff.
///
/// `from_path` and `to_path` hold the header paths exactly as written after
/// `--- ` and `+++ ` (including any `a/`/`b/` prefix, or `/dev/null`), so
/// re-serializing reproduces the original headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub from_path: String,
    pub to_path: String,
    pub hunks: Vec<Hunk>,
}

impl ParsedFile {
    /// Repository-relative path of the old side, `None` for added files.
    pub fn old_path(&self) -> Option<&str> {
        logical_path(&self.from_path, "a/")
    }

    /// Repository-relative path of the new side, `None` for deleted files.
    pub fn new_path(&self) -> Option<&str> {
        logical_path(&self.to_path, "b/")
    }

    pub fn additions(&self) -> usize {
        self.count(LineKind::Add)
    }

    pub fn deletions(&self) -> usize {
        self.count(LineKind::Delete)
    }

    fn count(&self, kind: LineKind) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| l.kind == kind)
            .count()
    }
}

fn logical_path<'a>(raw: &'a str, prefix: &str) -> Option<&'a str> {
    if raw == DEV_NULL || raw.is_empty() {
        return None;
    }
    Some(raw.strip_prefix(prefix).unwrap_or(raw))
}
