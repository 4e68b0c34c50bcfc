//! Long-lived coordinator state. Only mutated under the coordinator's lock.

use tokio::task::JoinHandle;

use crate::git::RevisionId;

/// Where the coordinator is in its debounce → attempt cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    DebounceScheduled,
    Attempting,
}

/// Flags and timer shared by `notify`, the timer task and attempt completion.
#[derive(Debug, Default)]
pub struct CoordinatorState {
    /// A notification arrived that has not been fully processed.
    pub pending: bool,
    /// An attempt is executing.
    pub in_flight: bool,
    /// A notification arrived while the current attempt was executing.
    pub notified_in_flight: bool,
    /// HEAD after the last commit made by this coordinator.
    pub last_committed_revision: Option<RevisionId>,
    /// Set by shutdown; no timers are armed afterwards.
    pub stopped: bool,
    debounce: Option<JoinHandle<()>>,
    generation: u64,
}

impl CoordinatorState {
    pub fn phase(&self) -> Phase {
        if self.in_flight {
            Phase::Attempting
        } else if self.debounce.is_some() {
            Phase::DebounceScheduled
        } else {
            Phase::Idle
        }
    }

    /// Cancel the armed timer, if any, and invalidate its generation.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    /// Disarm and reserve the generation for the next timer.
    pub fn next_generation(&mut self) -> u64 {
        self.disarm();
        self.generation
    }

    pub fn set_timer(&mut self, handle: JoinHandle<()>) {
        self.debounce = Some(handle);
    }

    /// Claim the timer that fired. Returns false if it was superseded.
    pub fn claim_timer(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.debounce.is_none() {
            return false;
        }
        // The handle belongs to the running task; dropping it only detaches.
        self.debounce = None;
        true
    }
}
