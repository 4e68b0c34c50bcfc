//! Per-file and combined change summaries.

pub mod summarizer;

pub use summarizer::{FileSummaries, Summarize, Summarizer, summarize_changes};
