//! Change collection from the repository interface.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use crate::error::RepositoryError;
use crate::git::Repository;

/// How a path was classified when it was first found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Untracked,
    Unstaged,
    Staged,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Untracked => write!(f, "new file"),
            ChangeKind::Unstaged => write!(f, "unstaged changes"),
            ChangeKind::Staged => write!(f, "staged changes"),
        }
    }
}

/// One changed file: its content before and after the change.
///
/// An empty `previous_content` means the file did not exist before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
    pub previous_content: String,
    pub current_content: String,
}

impl ChangeRecord {
    pub fn is_new_file(&self) -> bool {
        self.previous_content.is_empty()
    }
}

/// Snapshot everything currently modified in the repository.
///
/// Untracked files come first, then working-tree changes against the index,
/// then index changes against HEAD; `staged_only` skips the first two. A path
/// is reported once, with the classification it was first found under.
/// Unreadable individual files are skipped or read as empty; only failures to
/// enumerate changes are errors. An empty result means there is nothing to do.
pub fn collect_changes<R: Repository + ?Sized>(
    repo: &R,
    staged_only: bool,
) -> Result<Vec<ChangeRecord>, RepositoryError> {
    let mut changes = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    if !staged_only {
        for path in repo.list_untracked()? {
            if seen.contains(&path) {
                continue;
            }
            match repo.read_working_file(&path) {
                Ok(current) => {
                    debug!("Found new file: {}", path);
                    seen.insert(path.clone());
                    changes.push(ChangeRecord {
                        path,
                        kind: ChangeKind::Untracked,
                        previous_content: String::new(),
                        current_content: current,
                    });
                }
                Err(e) => warn!("Could not read new file {}: {}", path, e),
            }
        }

        for path in repo.list_unstaged()? {
            if !seen.insert(path.clone()) {
                continue;
            }
            let current = repo.read_working_file(&path).unwrap_or_else(|e| {
                warn!("Could not read current content for {}: {}", path, e);
                String::new()
            });
            // A lookup failure means the path is new to the index.
            let previous = repo.read_indexed_file(&path).unwrap_or_default();
            debug!("Found unstaged changes: {}", path);
            changes.push(ChangeRecord {
                path,
                kind: ChangeKind::Unstaged,
                previous_content: previous,
                current_content: current,
            });
        }
    }

    let staged = repo.list_staged()?;
    if staged.iter().any(|p| !seen.contains(p)) {
        let head = repo.head_revision()?;
        for path in staged {
            if !seen.insert(path.clone()) {
                continue;
            }
            let current = repo.read_indexed_file(&path).unwrap_or_default();
            let previous = match &head {
                Some(revision) => repo.read_revision_file(revision, &path).unwrap_or_default(),
                None => String::new(),
            };
            debug!("Found staged changes: {}", path);
            changes.push(ChangeRecord {
                path,
                kind: ChangeKind::Staged,
                previous_content: previous,
                current_content: current,
            });
        }
    }

    Ok(changes)
}
