//! autoscribe - watches a git working tree and commits changes with generated messages.
//!
//! # Overview
//!
//! autoscribe collects changed file contents, asks a text-generation service for a
//! summary of each file and then for a combined commit message, and commits. In
//! watch mode a debounced coordinator turns bursts of filesystem events into one
//! serialized attempt at a time.

pub mod changes;
pub mod config;
pub mod coordinator;
pub mod driver;
pub mod error;
pub mod git;
pub mod llm;
pub mod logging;
pub mod summarize;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use changes::{ChangeKind, ChangeRecord, collect_changes};
pub use config::SummarizerConfig;
pub use coordinator::{AttemptOutcome, Coordinator, CoordinatorOptions, Phase};
pub use error::{
    AttemptError, CommitError, ConfigError, ReadError, RepositoryError, ServiceError,
    SummarizeError, WatchError,
};
pub use git::{GitRepository, Repository, RevisionId};
pub use summarize::{FileSummaries, Summarize, Summarizer};
