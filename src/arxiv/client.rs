use reqwest::{Client, StatusCode};
use reqwest::header::ACCEPT;
use tracing::{debug, info, warn};

use super::SearchError;
use super::feed::parse_feed;
use super::normalize::normalize_all;
use super::types::{PaperRecord, SearchRequest};

const API_URL: &str = "https://export.arxiv.org/api/query";
const ERROR_SNIPPET_CHARS: usize = 200;

/// Relevance-ranked paper search.
/// Implemented by `ArxivClient` for production; mock implementations used in tests.
pub trait PaperSearch {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<PaperRecord>, SearchError>;
}

/// Client for the arXiv Atom query API.
///
/// Issues exactly one request per search. Failures are surfaced as
/// `SearchError::ServiceUnavailable` and never retried here.
#[derive(Clone)]
pub struct ArxivClient {
    http: Client,
    base_url: String,
}

impl ArxivClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, API_URL)
    }

    pub fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_feed(&self, request: &SearchRequest) -> Result<String, SearchError> {
        let max_results = request.result_limit().to_string();
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("search_query", request.query()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .header(ACCEPT, "application/atom+xml, application/xml;q=0.9")
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "arXiv API error");
            return Err(classify_status(status, &text));
        }

        Ok(response.text().await?)
    }
}

/// arXiv answers a malformed query with 400 and an Atom feed whose single
/// entry carries the reason in `<summary>`.
fn classify_status(status: StatusCode, body: &str) -> SearchError {
    let end = body.floor_char_boundary(ERROR_SNIPPET_CHARS);
    let snippet = body[..end].trim();

    if status == StatusCode::BAD_REQUEST {
        let reason = parse_feed(body)
            .ok()
            .and_then(|entries| entries.into_iter().find_map(|e| e.summary))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| snippet.to_string());
        return SearchError::InvalidQuery(reason);
    }
    SearchError::ServiceUnavailable(format!("HTTP {status}: {snippet}"))
}

impl PaperSearch for ArxivClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<PaperRecord>, SearchError> {
        info!(query = %request.query(), limit = request.result_limit(), "arxiv:search");

        let body = self.fetch_feed(request).await?;
        let entries = parse_feed(&body)
            .map_err(|e| SearchError::ServiceUnavailable(format!("malformed Atom feed: {e}")))?;

        let (mut records, failures) = normalize_all(&entries);
        if records.is_empty()
            && let Some(first) = failures.into_iter().next()
        {
            return Err(SearchError::Normalization(first));
        }

        records.truncate(request.result_limit());
        debug!(
            entries = entries.len(),
            records = records.len(),
            "arxiv search complete"
        );
        Ok(records)
    }
}
