use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SearchError;

pub const DEFAULT_RESULT_LIMIT: usize = 10;
/// Upper bound on results per search; larger limits are clamped.
pub const MAX_RESULT_LIMIT: usize = 50;

/// One normalized arXiv paper. Only built through `normalize::normalize_entry`,
/// so every field is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub published_date: NaiveDate,
    pub summary: String,
    pub pdf_url: String,
}

/// Validated search input: trimmed non-empty query and a limit in `1..=MAX_RESULT_LIMIT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    result_limit: usize,
}

impl SearchRequest {
    pub fn new(query: &str, result_limit: usize) -> Result<Self, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("query must not be empty".into()));
        }
        if result_limit == 0 {
            return Err(SearchError::InvalidQuery(
                "result limit must be a positive integer".into(),
            ));
        }
        Ok(Self {
            query: query.to_string(),
            result_limit: result_limit.min(MAX_RESULT_LIMIT),
        })
    }

    pub fn with_default_limit(query: &str) -> Result<Self, SearchError> {
        Self::new(query, DEFAULT_RESULT_LIMIT)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }
}

/// An `<entry>` as it appears in the Atom feed, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
    pub pdf_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_trims_query() {
        let req = SearchRequest::new("  graph neural networks \n", 5).unwrap();
        assert_eq!(req.query(), "graph neural networks");
        assert_eq!(req.result_limit(), 5);
    }

    #[test]
    fn request_rejects_blank_query() {
        for q in ["", "   ", "\t\n"] {
            let err = SearchRequest::new(q, 5).unwrap_err();
            assert!(matches!(err, SearchError::InvalidQuery(_)), "query {q:?}");
        }
    }

    #[test]
    fn request_rejects_zero_limit() {
        let err = SearchRequest::new("transformers", 0).unwrap_err();
        assert!(err.to_string().contains("positive"), "got: {err}");
    }

    #[test]
    fn request_clamps_large_limit() {
        let req = SearchRequest::new("transformers", 500).unwrap();
        assert_eq!(req.result_limit(), MAX_RESULT_LIMIT);
    }

    #[test]
    fn default_limit_is_ten() {
        let req = SearchRequest::with_default_limit("transformers").unwrap();
        assert_eq!(req.result_limit(), 10);
    }

    #[test]
    fn record_serializes_date_as_ymd() {
        let record = PaperRecord {
            title: "A".into(),
            authors: vec!["B".into()],
            published_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            summary: "S".into(),
            pdf_url: "https://arxiv.org/pdf/1".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["published_date"], "2024-03-09");
    }
}
