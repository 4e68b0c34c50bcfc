//! One collect → summarize → commit attempt.

use tracing::{debug, info};

use crate::changes::collect_changes;
use crate::error::AttemptError;
use crate::git::{Repository, RevisionId};
use crate::summarize::{Summarize, summarize_changes};

/// How an attempt ended.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Staged-only mode and nothing is staged.
    NothingStaged,
    /// HEAD is still at our last commit and no notification triggered the run.
    UpToDate,
    /// The snapshot was empty.
    NoChanges,
    Committed {
        revision: RevisionId,
        message: String,
        files: Vec<String>,
    },
    /// Aborted; nothing was committed.
    Failed(AttemptError),
}

impl AttemptOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, AttemptOutcome::Committed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AttemptOutcome::Failed(_))
    }
}

/// Inputs captured from coordinator state when the attempt began.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    pub staged_only: bool,
    pub triggered_by_notification: bool,
    pub last_committed_revision: Option<RevisionId>,
}

/// Run one attempt. Errors are returned as [`AttemptOutcome::Failed`].
pub async fn run_attempt<R, S>(repo: &R, summarizer: &S, ctx: &AttemptContext) -> AttemptOutcome
where
    R: Repository + ?Sized,
    S: Summarize + ?Sized,
{
    match try_attempt(repo, summarizer, ctx).await {
        Ok(outcome) => outcome,
        Err(e) => AttemptOutcome::Failed(e),
    }
}

async fn try_attempt<R, S>(
    repo: &R,
    summarizer: &S,
    ctx: &AttemptContext,
) -> Result<AttemptOutcome, AttemptError>
where
    R: Repository + ?Sized,
    S: Summarize + ?Sized,
{
    if ctx.staged_only && repo.list_staged()?.is_empty() {
        info!("No staged changes to commit.");
        return Ok(AttemptOutcome::NothingStaged);
    }

    let head = repo.head_revision()?;
    if !ctx.triggered_by_notification
        && ctx.last_committed_revision.is_some()
        && head == ctx.last_committed_revision
    {
        debug!("No new changes since last commit, skipping...");
        return Ok(AttemptOutcome::UpToDate);
    }

    let changes = collect_changes(repo, ctx.staged_only)?;
    if changes.is_empty() {
        info!("No changes detected.");
        return Ok(AttemptOutcome::NoChanges);
    }

    info!("Generating summaries for {} file(s)...", changes.len());
    let summaries = summarize_changes(summarizer, &changes).await?;

    info!("Generating commit message...");
    let message = summarizer.summarize_all(&summaries).await?;

    if !ctx.staged_only {
        repo.stage_all()?;
    }
    let revision = repo.commit(&message)?;

    if ctx.staged_only {
        info!("Committed staged changes as {} with message:\n{}", revision, message);
    } else {
        info!("Committed all changes as {} with message:\n{}", revision, message);
    }

    Ok(AttemptOutcome::Committed {
        revision,
        message,
        files: changes.into_iter().map(|c| c.path).collect(),
    })
}
