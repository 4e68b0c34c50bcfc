//! Error types for autoscribe modules using thiserror.

use thiserror::Error;

/// Errors from reading repository state (status, index, HEAD).
///
/// Fatal at startup; mid-watch it only aborts the current attempt.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to open repository: {0}")]
    Open(#[source] git2::Error),

    #[error("Failed to read repository status: {0}")]
    Status(#[source] git2::Error),

    #[error("Failed to resolve HEAD: {0}")]
    Head(#[source] git2::Error),

    #[error("Failed to diff index against HEAD: {0}")]
    Diff(#[source] git2::Error),
}

/// Errors from reading a single file version. Never fatal: the file is skipped
/// or treated as empty by the collector.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not in the index")]
    NotInIndex(String),

    #[error("{path} does not exist in revision {revision}")]
    NotInRevision { path: String, revision: String },

    #[error("Failed to load object for {path}: {source}")]
    Object {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("{0} is not valid UTF-8 text")]
    NotUtf8(String),
}

/// Errors from the text-generation endpoint.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Request to summarization service failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Summarization service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Summarization service returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Summarization service returned no choices")]
    EmptyResponse,
}

/// Errors from the summarizer client.
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Failed to summarize {path}: {source}")]
    File {
        path: String,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to generate combined commit message: {0}")]
    Combined(#[source] ServiceError),
}

/// Errors from staging and committing.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Failed to stage changes: {0}")]
    Staging(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    Commit(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    Config(#[source] git2::Error),
}

/// An error that aborted one collect → summarize → commit attempt.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "No API key for the summarization service. Set AUTOSCRIBE_API_KEY (or HYPERBOLIC_API_KEY)"
    )]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors from the filesystem watcher.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to watch repository: {0}")]
    Watcher(#[from] notify::Error),
}
