//! The repository interface consumed by the collector and coordinator, and its
//! git2-backed implementation.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use git2::{Diff, ErrorCode, IndexAddOption, Oid, StatusOptions, Tree};

use crate::error::{CommitError, ReadError, RepositoryError};

/// Identifier of a commit (hex object id for git).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Oid> for RevisionId {
    fn from(oid: Oid) -> Self {
        Self(oid.to_string())
    }
}

/// Read/write operations on a version-controlled working tree.
///
/// Paths are relative to the repository root and use `/` separators.
pub trait Repository: Send + Sync {
    /// The commit HEAD points at, or `None` when there are no commits yet.
    fn head_revision(&self) -> Result<Option<RevisionId>, RepositoryError>;

    /// Paths not tracked by the index (ignored files excluded).
    fn list_untracked(&self) -> Result<Vec<String>, RepositoryError>;

    /// Paths whose working copy differs from the index.
    fn list_unstaged(&self) -> Result<Vec<String>, RepositoryError>;

    /// Paths whose index entry differs from HEAD.
    fn list_staged(&self) -> Result<Vec<String>, RepositoryError>;

    fn read_working_file(&self, path: &str) -> Result<String, ReadError>;

    fn read_indexed_file(&self, path: &str) -> Result<String, ReadError>;

    fn read_revision_file(&self, revision: &RevisionId, path: &str) -> Result<String, ReadError>;

    /// Stage every addition, modification and deletion under the root.
    fn stage_all(&self) -> Result<(), CommitError>;

    /// Commit the current index on top of HEAD and return the new revision.
    fn commit(&self, message: &str) -> Result<RevisionId, CommitError>;
}

/// Find the root of the work tree containing `path`, searching parent directories.
pub fn find_repository_root(path: &Path) -> Result<PathBuf, RepositoryError> {
    let repo = git2::Repository::discover(path).map_err(RepositoryError::Open)?;
    repo.workdir().map(Path::to_path_buf).ok_or_else(|| {
        RepositoryError::Open(git2::Error::from_str(
            "bare repositories have no working tree to watch",
        ))
    })
}

/// [`Repository`] backed by git2.
///
/// The underlying `git2::Repository` is reopened for every operation so the
/// index and refs always reflect changes made by other processes (a manual
/// `git add`, an editor's git integration) between attempts.
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    /// Open the repository whose work tree contains `path`.
    pub fn discover(path: &Path) -> Result<Self, RepositoryError> {
        let root = find_repository_root(path)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open(&self) -> Result<git2::Repository, git2::Error> {
        git2::Repository::open(&self.root)
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
fn resolve_head_tree(repo: &git2::Repository) -> Result<Option<Tree<'_>>, git2::Error> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if is_unborn(&e) => return Ok(None),
        Err(e) => return Err(e),
    };

    head_ref.peel_to_tree().map(Some)
}

fn is_unborn(e: &git2::Error) -> bool {
    e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound
}

/// Paths touched by a diff, in delta order.
fn diff_paths(diff: &Diff<'_>) -> Vec<String> {
    diff.deltas()
        .filter_map(|delta| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string())
        })
        .filter(|p| !p.is_empty())
        .collect()
}

fn blob_text(path: &str, bytes: &[u8]) -> Result<String, ReadError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| ReadError::NotUtf8(path.to_string()))
}

impl Repository for GitRepository {
    fn head_revision(&self) -> Result<Option<RevisionId>, RepositoryError> {
        let repo = self.open().map_err(RepositoryError::Open)?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Ok(None),
            Err(e) => return Err(RepositoryError::Head(e)),
        };
        let commit = head.peel_to_commit().map_err(RepositoryError::Head)?;
        Ok(Some(commit.id().into()))
    }

    fn list_untracked(&self) -> Result<Vec<String>, RepositoryError> {
        let repo = self.open().map_err(RepositoryError::Open)?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);
        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(RepositoryError::Status)?;

        Ok(statuses
            .iter()
            .filter(|entry| entry.status().is_wt_new())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    fn list_unstaged(&self) -> Result<Vec<String>, RepositoryError> {
        let repo = self.open().map_err(RepositoryError::Open)?;
        let diff = repo
            .diff_index_to_workdir(None, None)
            .map_err(RepositoryError::Status)?;
        Ok(diff_paths(&diff))
    }

    fn list_staged(&self) -> Result<Vec<String>, RepositoryError> {
        let repo = self.open().map_err(RepositoryError::Open)?;
        let head_tree = resolve_head_tree(&repo).map_err(RepositoryError::Head)?;
        let diff = repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(RepositoryError::Diff)?;
        Ok(diff_paths(&diff))
    }

    fn read_working_file(&self, path: &str) -> Result<String, ReadError> {
        std::fs::read_to_string(self.root.join(path)).map_err(|source| {
            if source.kind() == ErrorKind::InvalidData {
                ReadError::NotUtf8(path.to_string())
            } else {
                ReadError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }

    fn read_indexed_file(&self, path: &str) -> Result<String, ReadError> {
        let object_error = |source| ReadError::Object {
            path: path.to_string(),
            source,
        };
        let repo = self.open().map_err(object_error)?;
        let index = repo.index().map_err(object_error)?;
        let entry = index
            .get_path(Path::new(path), 0)
            .ok_or_else(|| ReadError::NotInIndex(path.to_string()))?;
        let blob = repo.find_blob(entry.id).map_err(object_error)?;
        blob_text(path, blob.content())
    }

    fn read_revision_file(&self, revision: &RevisionId, path: &str) -> Result<String, ReadError> {
        let object_error = |source| ReadError::Object {
            path: path.to_string(),
            source,
        };
        let repo = self.open().map_err(object_error)?;
        let oid = Oid::from_str(revision.as_str()).map_err(object_error)?;
        let tree = repo
            .find_commit(oid)
            .and_then(|commit| commit.tree())
            .map_err(object_error)?;
        let entry = tree.get_path(Path::new(path)).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                ReadError::NotInRevision {
                    path: path.to_string(),
                    revision: revision.to_string(),
                }
            } else {
                object_error(e)
            }
        })?;
        let blob = entry
            .to_object(&repo)
            .and_then(|object| object.peel_to_blob())
            .map_err(object_error)?;
        blob_text(path, blob.content())
    }

    fn stage_all(&self) -> Result<(), CommitError> {
        let repo = self.open().map_err(CommitError::Staging)?;
        let mut index = repo.index().map_err(CommitError::Staging)?;
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .map_err(CommitError::Staging)?;
        // add_all never removes entries; update_all picks up deleted files.
        index
            .update_all(["*"].iter(), None)
            .map_err(CommitError::Staging)?;
        index.write().map_err(CommitError::Staging)?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<RevisionId, CommitError> {
        let repo = self.open().map_err(CommitError::Commit)?;
        let mut index = repo.index().map_err(CommitError::Commit)?;
        let tree_id = index.write_tree().map_err(CommitError::Commit)?;
        let tree = repo.find_tree(tree_id).map_err(CommitError::Commit)?;

        let sig = repo.signature().map_err(CommitError::Config)?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(CommitError::Commit)?),
            Err(e) if is_unborn(&e) => None,
            Err(e) => return Err(CommitError::Commit(e)),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(CommitError::Commit)?;

        Ok(oid.into())
    }
}
