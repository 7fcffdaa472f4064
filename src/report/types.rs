use crate::prompt::{CHANGES_REQUIRED, LGTM, LGTM_WITH_SUGGESTIONS};

/// Overall status the model closed its review with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Lgtm,
    ChangesRequired,
    LgtmWithSuggestions,
    /// The review carried none of the status markers
    Unknown,
}

impl Verdict {
    /// Detect the verdict from the last status marker in `review`.
    pub fn detect(review: &str) -> Self {
        [
            (LGTM, Verdict::Lgtm),
            (CHANGES_REQUIRED, Verdict::ChangesRequired),
            (LGTM_WITH_SUGGESTIONS, Verdict::LgtmWithSuggestions),
        ]
        .into_iter()
        .filter_map(|(marker, verdict)| review.rfind(marker).map(|pos| (pos, verdict)))
        .max_by_key(|(pos, _)| *pos)
        .map(|(_, verdict)| verdict)
        .unwrap_or(Verdict::Unknown)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Lgtm => write!(f, "{LGTM}"),
            Verdict::ChangesRequired => write!(f, "{CHANGES_REQUIRED}"),
            Verdict::LgtmWithSuggestions => write!(f, "{LGTM_WITH_SUGGESTIONS}"),
            Verdict::Unknown => write!(f, "? No status given"),
        }
    }
}

/// A model review together with what was reviewed.
#[derive(Debug, Clone)]
pub struct Review {
    /// What was reviewed, e.g. `org/repo#42` or a file path
    pub subject: String,
    /// Review text as returned by the model
    pub text: String,
    pub verdict: Verdict,
}

impl Review {
    pub fn new(subject: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            subject: subject.into(),
            verdict: Verdict::detect(&text),
            text,
        }
    }
}
