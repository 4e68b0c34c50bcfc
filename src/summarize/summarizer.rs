//! Summarizer client: one completion per changed file, then one for the commit message.

use async_trait::async_trait;
use tracing::debug;

use crate::changes::ChangeRecord;
use crate::error::SummarizeError;
use crate::llm::{CompletionClient, CompletionOptions, build_combined_prompt, build_file_prompt};

/// Message used when there is nothing to summarize.
pub const NO_CHANGES_MESSAGE: &str = "No changes to commit";

/// Generated summaries keyed by path, in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSummaries {
    entries: Vec<(String, String)>,
}

impl FileSummaries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a summary, replacing an existing one for the same path in place.
    pub fn insert(&mut self, path: String, summary: String) {
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = summary,
            None => self.entries.push((path, summary)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, s)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Request/response summarization with no retry and no shared state.
#[async_trait]
pub trait Summarize: Send + Sync {
    /// Describe the change to a single file. An empty `previous` means a new file.
    async fn summarize_file(
        &self,
        path: &str,
        previous: &str,
        current: &str,
    ) -> Result<String, SummarizeError>;

    /// Turn all file summaries into one commit message.
    async fn summarize_all(&self, summaries: &FileSummaries) -> Result<String, SummarizeError>;
}

/// [`Summarize`] implementation over any [`CompletionClient`].
pub struct Summarizer<C> {
    client: C,
    options: CompletionOptions,
    use_emoji: bool,
}

impl<C: CompletionClient> Summarizer<C> {
    pub fn new(client: C, options: CompletionOptions, use_emoji: bool) -> Self {
        Self {
            client,
            options,
            use_emoji,
        }
    }
}

#[async_trait]
impl<C: CompletionClient> Summarize for Summarizer<C> {
    async fn summarize_file(
        &self,
        path: &str,
        previous: &str,
        current: &str,
    ) -> Result<String, SummarizeError> {
        let prompt = build_file_prompt(path, previous, current);
        debug!("File prompt for {}: {} chars", path, prompt.len());

        self.client
            .complete(&prompt, &self.options)
            .await
            .map_err(|source| SummarizeError::File {
                path: path.to_string(),
                source,
            })
    }

    async fn summarize_all(&self, summaries: &FileSummaries) -> Result<String, SummarizeError> {
        if summaries.is_empty() {
            return Ok(NO_CHANGES_MESSAGE.to_string());
        }

        let prompt = build_combined_prompt(summaries, self.use_emoji);
        debug!("Combined prompt: {} chars", prompt.len());

        self.client
            .complete(&prompt, &self.options)
            .await
            .map_err(SummarizeError::Combined)
    }
}

/// Summarize each change in order, one request at a time.
///
/// Stops at the first failure; nothing is returned for a partial run.
pub async fn summarize_changes<S: Summarize + ?Sized>(
    summarizer: &S,
    changes: &[ChangeRecord],
) -> Result<FileSummaries, SummarizeError> {
    let mut summaries = FileSummaries::new();
    for change in changes {
        debug!("Processing summary for: {}", change.path);
        let summary = summarizer
            .summarize_file(&change.path, &change.previous_content, &change.current_content)
            .await?;
        summaries.insert(change.path.clone(), summary);
    }
    Ok(summaries)
}
