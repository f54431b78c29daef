//! arXiv search: Atom feed retrieval, parsing, and normalization into `PaperRecord`s.

pub mod client;
mod feed;
pub mod format;
pub mod normalize;
pub mod types;

pub use client::{ArxivClient, PaperSearch};
pub use normalize::NormalizationError;
pub use types::{MAX_RESULT_LIMIT, PaperRecord, SearchRequest};

/// Errors returned by paper search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("arXiv service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("no arXiv entry could be normalized: {0}")]
    Normalization(#[from] NormalizationError),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        Self::ServiceUnavailable(e.to_string())
    }
}
