//! Run-once mode: collect, summarize, report. Never commits.

use std::fmt::Write as _;

use tracing::info;

use crate::changes::{ChangeRecord, collect_changes};
use crate::error::AttemptError;
use crate::git::Repository;
use crate::llm::prompt::SUMMARY_SEPARATOR_WIDTH;
use crate::summarize::{FileSummaries, Summarize, summarize_changes};

/// Everything a run-once pass produced.
#[derive(Debug, Clone)]
pub struct RunOnceReport {
    pub changes: Vec<ChangeRecord>,
    pub summaries: FileSummaries,
    /// `None` when there was nothing to summarize.
    pub message: Option<String>,
}

impl RunOnceReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Per-file summaries followed by the suggested commit message.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let separator = "-".repeat(SUMMARY_SEPARATOR_WIDTH);

        out.push_str("Individual File Summaries:\n");
        for (path, summary) in self.summaries.iter() {
            let _ = writeln!(out, "\nFile: {path}\nSummary:\n{summary}\n{separator}");
        }

        if let Some(message) = &self.message {
            let _ = writeln!(out, "\nSuggested Commit Message:\n{message}");
        }
        out
    }
}

/// Collect the current changes and summarize them without touching the repository.
pub async fn run_once<R, S>(
    repo: &R,
    summarizer: &S,
    staged_only: bool,
) -> Result<RunOnceReport, AttemptError>
where
    R: Repository + ?Sized,
    S: Summarize + ?Sized,
{
    let changes = collect_changes(repo, staged_only)?;
    if changes.is_empty() {
        return Ok(RunOnceReport {
            changes,
            summaries: FileSummaries::new(),
            message: None,
        });
    }

    info!("Generating summaries for {} file(s)...", changes.len());
    let summaries = summarize_changes(summarizer, &changes).await?;
    let message = summarizer.summarize_all(&summaries).await?;

    Ok(RunOnceReport {
        changes,
        summaries,
        message: Some(message),
    })
}
