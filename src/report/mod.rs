pub mod types;

pub use types::{Review, Verdict};

use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Output the review to the terminal (default) or to a markdown file.
#[instrument(skip(review), fields(subject = %review.subject, verdict = ?review.verdict))]
pub fn output(review: &Review, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing review to terminal");
            print_terminal_review(review);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing review to file");
            std::fs::write(path, render_markdown(review))?;
            Ok(())
        }
    }
}

fn print_terminal_review(review: &Review) {
    println!();
    println!("{}", review.text);
    println!();
    println!("═══ {} ═══", colorize_verdict(review.verdict));
    println!();
}

fn render_markdown(review: &Review) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Review: {}\n\n", review.subject));
    md.push_str(review.text.trim_end());
    md.push_str("\n\n");
    md.push_str(&format!("**Verdict:** {}\n", review.verdict));
    md
}

fn colorize_verdict(verdict: Verdict) -> colored::ColoredString {
    let label = verdict.to_string();
    match verdict {
        Verdict::Lgtm => label.green().bold(),
        Verdict::LgtmWithSuggestions => label.yellow().bold(),
        Verdict::ChangesRequired => label.red().bold(),
        Verdict::Unknown => label.dimmed(),
    }
}
