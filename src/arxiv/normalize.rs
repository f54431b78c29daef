use chrono::{DateTime, NaiveDate};
use tracing::warn;

use super::types::{PaperRecord, RawEntry};

/// Why a raw feed entry could not become a `PaperRecord`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("entry has no title")]
    MissingTitle,

    #[error("entry has no abstract")]
    MissingSummary,

    #[error("entry has no published timestamp")]
    MissingPublished,

    #[error("invalid published timestamp '{0}'")]
    InvalidPublished(String),

    #[error("entry has no PDF link or abs identifier")]
    MissingPdfUrl,

    #[error("invalid PDF URL '{0}'")]
    InvalidPdfUrl(String),
}

pub fn normalize_entry(entry: &RawEntry) -> Result<PaperRecord, NormalizationError> {
    let title = entry
        .title
        .as_deref()
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
        .ok_or(NormalizationError::MissingTitle)?;

    let summary = entry
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizationError::MissingSummary)?
        .to_string();

    let published = entry
        .published
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(NormalizationError::MissingPublished)?;
    let published_date = parse_published(published)?;

    let pdf_url = resolve_pdf_url(entry)?;

    let authors = entry
        .authors
        .iter()
        .map(|a| collapse_whitespace(a))
        .filter(|a| !a.is_empty())
        .collect();

    Ok(PaperRecord {
        title,
        authors,
        published_date,
        summary,
        pdf_url,
    })
}

/// Normalize every entry, dropping the ones that fail with a warning.
/// Returns the surviving records (in input order) and the failures.
pub fn normalize_all(entries: &[RawEntry]) -> (Vec<PaperRecord>, Vec<NormalizationError>) {
    let mut records = Vec::with_capacity(entries.len());
    let mut failures = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        match normalize_entry(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    index,
                    id = entry.id.as_deref().unwrap_or("<none>"),
                    error = %e,
                    "skipping arXiv entry that failed normalization"
                );
                failures.push(e);
            }
        }
    }

    (records, failures)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// arXiv publishes RFC 3339 timestamps; a bare `YYYY-MM-DD` is accepted too.
fn parse_published(raw: &str) -> Result<NaiveDate, NormalizationError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| NormalizationError::InvalidPublished(raw.to_string()))
}

fn resolve_pdf_url(entry: &RawEntry) -> Result<String, NormalizationError> {
    let candidate = match entry.pdf_link.as_deref().map(str::trim) {
        Some(link) if !link.is_empty() => link.to_string(),
        _ => entry
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| id.contains("/abs/"))
            .map(|id| id.replacen("/abs/", "/pdf/", 1))
            .ok_or(NormalizationError::MissingPdfUrl)?,
    };

    match url::Url::parse(&candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(candidate),
        _ => Err(NormalizationError::InvalidPdfUrl(candidate)),
    }
}
