//! In-memory fakes for the repository and summarizer, shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CommitError, ReadError, RepositoryError, ServiceError, SummarizeError};
use crate::git::{Repository, RevisionId};
use crate::summarize::{FileSummaries, Summarize};

#[derive(Default)]
struct RepoState {
    head: Option<RevisionId>,
    untracked: Vec<String>,
    unstaged: Vec<String>,
    staged: Vec<String>,
    working: HashMap<String, String>,
    index: HashMap<String, String>,
    head_files: HashMap<String, String>,
    unreadable: HashSet<String>,
    status_fails: bool,
    commit_fails: bool,
    staged_everything: bool,
    stage_all_calls: usize,
    collections: usize,
    commits: Vec<String>,
}

/// A repository whose changes are declared by the test.
///
/// `commit` clears the staged list, and everything else too when `stage_all`
/// ran first. Each commit moves HEAD to `rev<N>`.
#[derive(Clone, Default)]
pub struct FakeRepository {
    state: Arc<Mutex<RepoState>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head(revision: &str) -> Self {
        let repo = Self::new();
        repo.set_head(revision);
        repo
    }

    pub fn set_head(&self, revision: &str) {
        self.state.lock().unwrap().head = Some(RevisionId::new(revision));
    }

    pub fn add_untracked(&self, path: &str, content: &str) {
        let mut state = self.state.lock().unwrap();
        state.untracked.push(path.to_string());
        state.working.insert(path.to_string(), content.to_string());
    }

    pub fn add_unreadable_untracked(&self, path: &str) {
        let mut state = self.state.lock().unwrap();
        state.untracked.push(path.to_string());
        state.unreadable.insert(path.to_string());
    }

    pub fn add_unstaged(&self, path: &str, indexed: &str, working: &str) {
        let mut state = self.state.lock().unwrap();
        state.unstaged.push(path.to_string());
        state.index.insert(path.to_string(), indexed.to_string());
        state.working.insert(path.to_string(), working.to_string());
    }

    pub fn add_staged(&self, path: &str, head: &str, indexed: &str) {
        let mut state = self.state.lock().unwrap();
        state.staged.push(path.to_string());
        if !head.is_empty() {
            state.head_files.insert(path.to_string(), head.to_string());
        }
        state.index.insert(path.to_string(), indexed.to_string());
    }

    pub fn fail_status(&self) {
        self.state.lock().unwrap().status_fails = true;
    }

    pub fn fail_commits(&self, fail: bool) {
        self.state.lock().unwrap().commit_fails = fail;
    }

    pub fn commits(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    pub fn stage_all_calls(&self) -> usize {
        self.state.lock().unwrap().stage_all_calls
    }

    /// Number of times the staged list was enumerated.
    pub fn collections(&self) -> usize {
        self.state.lock().unwrap().collections
    }
}

impl Repository for FakeRepository {
    fn head_revision(&self) -> Result<Option<RevisionId>, RepositoryError> {
        Ok(self.state.lock().unwrap().head.clone())
    }

    fn list_untracked(&self) -> Result<Vec<String>, RepositoryError> {
        let state = self.state.lock().unwrap();
        if state.status_fails {
            return Err(RepositoryError::Status(git2::Error::from_str(
                "status unavailable",
            )));
        }
        Ok(state.untracked.clone())
    }

    fn list_unstaged(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.state.lock().unwrap().unstaged.clone())
    }

    fn list_staged(&self) -> Result<Vec<String>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        state.collections += 1;
        Ok(state.staged.clone())
    }

    fn read_working_file(&self, path: &str) -> Result<String, ReadError> {
        let state = self.state.lock().unwrap();
        if state.unreadable.contains(path) {
            return Err(ReadError::NotUtf8(path.to_string()));
        }
        state.working.get(path).cloned().ok_or_else(|| ReadError::Io {
            path: path.to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }

    fn read_indexed_file(&self, path: &str) -> Result<String, ReadError> {
        self.state
            .lock()
            .unwrap()
            .index
            .get(path)
            .cloned()
            .ok_or_else(|| ReadError::NotInIndex(path.to_string()))
    }

    fn read_revision_file(&self, revision: &RevisionId, path: &str) -> Result<String, ReadError> {
        self.state
            .lock()
            .unwrap()
            .head_files
            .get(path)
            .cloned()
            .ok_or_else(|| ReadError::NotInRevision {
                path: path.to_string(),
                revision: revision.to_string(),
            })
    }

    fn stage_all(&self) -> Result<(), CommitError> {
        let mut state = self.state.lock().unwrap();
        state.stage_all_calls += 1;
        state.staged_everything = true;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<RevisionId, CommitError> {
        let mut state = self.state.lock().unwrap();
        if state.commit_fails {
            return Err(CommitError::Commit(git2::Error::from_str("commit rejected")));
        }
        state.commits.push(message.to_string());
        let revision = RevisionId::new(format!("rev{}", state.commits.len()));
        state.head = Some(revision.clone());
        state.staged.clear();
        if std::mem::take(&mut state.staged_everything) {
            state.untracked.clear();
            state.unstaged.clear();
        }
        Ok(revision)
    }
}

#[derive(Default)]
struct SummarizerState {
    file_calls: Vec<String>,
    combined_calls: usize,
    fail_combined: bool,
    active: usize,
    max_active: usize,
}

/// A summarizer that answers instantly (or after `delay`) and records calls.
#[derive(Clone, Default)]
pub struct FakeSummarizer {
    state: Arc<Mutex<SummarizerState>>,
    delay: Duration,
}

impl FakeSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call takes `delay` of (tokio) time.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn fail_combined(&self, fail: bool) {
        self.state.lock().unwrap().fail_combined = fail;
    }

    pub fn file_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().file_calls.clone()
    }

    pub fn combined_calls(&self) -> usize {
        self.state.lock().unwrap().combined_calls
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_active(&self) -> usize {
        self.state.lock().unwrap().max_active
    }

    async fn enter(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.active += 1;
            state.max_active = state.max_active.max(state.active);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn leave(&self) {
        self.state.lock().unwrap().active -= 1;
    }
}

#[async_trait]
impl Summarize for FakeSummarizer {
    async fn summarize_file(
        &self,
        path: &str,
        _previous: &str,
        _current: &str,
    ) -> Result<String, SummarizeError> {
        self.enter().await;
        self.state.lock().unwrap().file_calls.push(path.to_string());
        self.leave();
        Ok(format!("summary of {path}"))
    }

    async fn summarize_all(&self, summaries: &FileSummaries) -> Result<String, SummarizeError> {
        self.enter().await;
        let fail = {
            let mut state = self.state.lock().unwrap();
            state.combined_calls += 1;
            state.fail_combined
        };
        self.leave();
        if fail {
            return Err(SummarizeError::Combined(ServiceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }));
        }
        Ok(format!("chore: update {} files", summaries.len()))
    }
}
