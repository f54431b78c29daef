use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tracing::{info, warn};

use crate::arxiv::{PaperRecord, PaperSearch, SearchError, SearchRequest};
use crate::config::ReviewConfig;
use crate::team::{ReviewLine, SummarizationError, Summarizer, TeamEvent};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("paper count must be a positive integer")]
    InvalidPaperCount,

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationError),
}

/// Search, select the top-ranked papers, and stream the team's review.
pub struct ReviewPipeline<S, Z> {
    search: S,
    summarizer: Z,
    config: ReviewConfig,
}

impl<S: PaperSearch, Z: Summarizer> ReviewPipeline<S, Z> {
    pub fn new(search: S, summarizer: Z, config: ReviewConfig) -> Self {
        Self {
            search,
            summarizer,
            config,
        }
    }

    /// Lines are yielded as the summarizer produces them. A search failure
    /// yields only the error; a summarizer failure yields the error after
    /// whatever lines were already produced.
    pub fn generate_review<'a>(
        &'a self,
        topic: &'a str,
        paper_count: usize,
    ) -> impl Stream<Item = Result<ReviewLine, ReviewError>> + 'a {
        try_stream! {
            let (request, paper_count) = plan(&self.config, topic, paper_count)?;
            info!(
                topic = %request.query(),
                paper_count,
                candidates = request.result_limit(),
                "review:start"
            );

            let candidates = self.search.search(&request).await?;
            let selected = select_top(candidates, paper_count);
            if selected.len() < paper_count {
                warn!(
                    requested = paper_count,
                    available = selected.len(),
                    "fewer papers than requested, continuing with what was found"
                );
            }

            let mut events = self.summarizer.summarize(request.query(), selected);
            while let Some(event) = events.next().await {
                match event {
                    TeamEvent::Line(line) => {
                        yield line;
                    }
                    TeamEvent::Completed { turns } => {
                        info!(turns, "review complete");
                        return;
                    }
                    TeamEvent::Failed(e) => {
                        warn!(error = %e, "summarization failed");
                        Err::<(), _>(ReviewError::Summarization(e))?;
                    }
                }
            }

            Err::<(), _>(ReviewError::Summarization(SummarizationError::Incomplete))?;
        }
    }
}

/// Validate the caller's input into a search request and an effective paper count.
fn plan(
    config: &ReviewConfig,
    topic: &str,
    paper_count: usize,
) -> Result<(SearchRequest, usize), ReviewError> {
    if paper_count == 0 {
        return Err(ReviewError::InvalidPaperCount);
    }
    let max = config.max_papers();
    if paper_count > max {
        warn!(requested = paper_count, max, "paper count clamped");
    }
    let request = SearchRequest::new(topic, config.candidate_ceiling())?;
    Ok((request, paper_count.min(max)))
}

/// Keep the first `count` records; the search service's ranking is authoritative.
pub fn select_top(mut ranked: Vec<PaperRecord>, count: usize) -> Vec<PaperRecord> {
    ranked.truncate(count);
    ranked
}
