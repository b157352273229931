use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Malformed source: {0}")]
    MalformedSource(String),

    #[error("Cannot build an index over an empty corpus")]
    EmptyCorpus,

    #[error("Index has not been built yet")]
    NotBuilt,

    #[error("top_n must be at least 1, got {0}")]
    InvalidTopN(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snapshot failed: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
