//! Snapshotting the working tree into per-file change records.

pub mod collector;

pub use collector::{ChangeKind, ChangeRecord, collect_changes};
