//! Entry points used by the binary: a single summarize-and-print pass, and the
//! long-running watch loop feeding the coordinator.

pub mod once;
pub mod watch;

pub use once::{RunOnceReport, run_once};
pub use watch::{is_relevant_event, watch_repository};
