//! Git operations using git2-rs.

pub mod repository;

pub use repository::{GitRepository, Repository, RevisionId, find_repository_root};
