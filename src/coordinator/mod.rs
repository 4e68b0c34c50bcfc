//! Debounced commit coordination.
//!
//! Turns a bursty stream of "something changed" notifications into a serialized
//! sequence of collect → summarize → commit attempts:
//!
//! - `notify()` (re)arms a single debounce timer; only a quiet period of the
//!   configured delay lets an attempt start.
//! - At most one attempt runs at a time. A notification that arrives while an
//!   attempt is running is remembered and schedules a fresh attempt once the
//!   current one completes.
//! - Attempt failures are logged and never escape; the coordinator returns to
//!   `Idle` (or `DebounceScheduled`) either way.
//!
//! State lives behind one async mutex which is never held across repository or
//! network I/O.

pub mod attempt;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info};

use crate::git::{Repository, RevisionId};
use crate::summarize::Summarize;

pub use attempt::{AttemptContext, AttemptOutcome, run_attempt};
pub use state::{CoordinatorState, Phase};

/// Default quiet period before an attempt, in seconds.
pub const DEFAULT_DEBOUNCE_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub delay: Duration,
    pub staged_only: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(DEFAULT_DEBOUNCE_SECS),
            staged_only: false,
        }
    }
}

struct Inner<R, S> {
    repo: R,
    summarizer: S,
    options: CoordinatorOptions,
    state: Mutex<CoordinatorState>,
    /// Signalled whenever an attempt completes.
    attempt_done: Notify,
}

/// The commit coordinator. Cheap to clone; clones share state.
pub struct Coordinator<R, S> {
    inner: Arc<Inner<R, S>>,
}

impl<R, S> Clone for Coordinator<R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, S> Coordinator<R, S>
where
    R: Repository + 'static,
    S: Summarize + 'static,
{
    pub fn new(repo: R, summarizer: S, options: CoordinatorOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                repo,
                summarizer,
                options,
                state: Mutex::new(CoordinatorState::default()),
                attempt_done: Notify::new(),
            }),
        }
    }

    pub fn staged_only(&self) -> bool {
        self.inner.options.staged_only
    }

    pub async fn phase(&self) -> Phase {
        self.inner.state.lock().await.phase()
    }

    /// Whether a change has been seen that no attempt has fully processed.
    ///
    /// Stays true after a failed attempt while the phase is `Idle`: failures
    /// are not retried, the next notification starts a fresh attempt.
    pub async fn is_pending(&self) -> bool {
        self.inner.state.lock().await.pending
    }

    pub async fn last_committed_revision(&self) -> Option<RevisionId> {
        self.inner.state.lock().await.last_committed_revision.clone()
    }

    /// Record that something changed and (re)start the debounce timer.
    ///
    /// While an attempt is running the timer is left alone; the change is
    /// picked up by a new attempt scheduled when the current one finishes.
    pub async fn notify(&self) {
        let mut state = self.inner.state.lock().await;
        if state.stopped {
            return;
        }

        state.pending = true;
        if state.in_flight {
            state.notified_in_flight = true;
            debug!("Attempt in progress, change will be processed afterwards");
            return;
        }

        self.arm_timer(&mut state);
        debug!(
            "Scheduled processing in {} seconds",
            self.inner.options.delay.as_secs_f32()
        );
    }

    /// Run one attempt now, cancelling any armed timer.
    ///
    /// Returns `None` without doing anything if an attempt is already running
    /// (the request is then treated like a notification) or after shutdown.
    pub async fn attempt(&self) -> Option<AttemptOutcome> {
        let ctx = {
            let mut state = self.inner.state.lock().await;
            if state.stopped {
                return None;
            }
            if state.in_flight {
                state.pending = true;
                state.notified_in_flight = true;
                return None;
            }
            state.disarm();
            Self::begin(&mut state, self.inner.options.staged_only)
        };

        Some(self.execute(ctx).await)
    }

    /// Cancel the armed timer, stop scheduling, and wait for a running attempt.
    pub async fn shutdown(&self) {
        let done = self.inner.attempt_done.notified();
        tokio::pin!(done);
        done.as_mut().enable();

        {
            let mut state = self.inner.state.lock().await;
            state.stopped = true;
            state.disarm();
            if !state.in_flight {
                return;
            }
            info!("Waiting for the running attempt to finish...");
        }

        done.await;
    }

    fn arm_timer(&self, state: &mut CoordinatorState) {
        let generation = state.next_generation();
        let coordinator = self.clone();
        let delay = self.inner.options.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            coordinator.fire(generation).await;
        });
        state.set_timer(handle);
    }

    async fn fire(&self, generation: u64) {
        let ctx = {
            let mut state = self.inner.state.lock().await;
            if state.stopped || !state.claim_timer(generation) {
                return;
            }
            // Timers are never armed while an attempt runs.
            if state.in_flight {
                return;
            }
            Self::begin(&mut state, self.inner.options.staged_only)
        };

        self.execute(ctx).await;
    }

    fn begin(state: &mut CoordinatorState, staged_only: bool) -> AttemptContext {
        state.in_flight = true;
        state.notified_in_flight = false;
        AttemptContext {
            staged_only,
            triggered_by_notification: state.pending,
            last_committed_revision: state.last_committed_revision.clone(),
        }
    }

    async fn execute(&self, ctx: AttemptContext) -> AttemptOutcome {
        info!("Starting to process changes...");
        let outcome = run_attempt(&self.inner.repo, &self.inner.summarizer, &ctx).await;

        if let AttemptOutcome::Failed(e) = &outcome {
            error!("Error during auto-commit: {}", e);
        }

        self.finish(&outcome).await;
        outcome
    }

    async fn finish(&self, outcome: &AttemptOutcome) {
        {
            let mut state = self.inner.state.lock().await;
            state.in_flight = false;
            let notified = std::mem::take(&mut state.notified_in_flight);

            match outcome {
                AttemptOutcome::Committed { revision, .. } => {
                    state.last_committed_revision = Some(revision.clone());
                    state.pending = notified;
                }
                AttemptOutcome::NothingStaged
                | AttemptOutcome::UpToDate
                | AttemptOutcome::NoChanges => {
                    state.pending = notified;
                }
                // Failures leave `pending` as it was; they are not retried.
                AttemptOutcome::Failed(_) => {}
            }

            if notified && !state.stopped {
                debug!("New changes detected during processing, scheduling another run...");
                self.arm_timer(&mut state);
            }
        }

        self.inner.attempt_done.notify_waiters();
    }
}
