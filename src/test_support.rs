//! Shared fixtures and mock collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use futures::StreamExt;
use futures::stream::{self, BoxStream};

use crate::arxiv::{PaperRecord, PaperSearch, SearchError, SearchRequest};
use crate::openai::{ChatError, ChatMessage, ChatModel};
use crate::team::agents::CANDIDATE_AGENT;

pub fn paper(title: &str) -> PaperRecord {
    let slug = title.to_lowercase().replace(' ', "-");
    PaperRecord {
        title: title.to_string(),
        authors: vec![format!("{title} Author")],
        published_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        summary: format!("Abstract of {title}."),
        pdf_url: format!("http://arxiv.org/pdf/{slug}"),
    }
}

/// Search backend returning queued responses and recording requests.
pub struct MockSearch {
    responses: Mutex<VecDeque<Result<Vec<PaperRecord>, SearchError>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockSearch {
    pub fn with_papers(papers: Vec<PaperRecord>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Ok(papers)])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: SearchError) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from([Err(error)])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn captured_requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PaperSearch for MockSearch {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<PaperRecord>, SearchError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        let mut papers = match next {
            Some(response) => response?,
            None => return Err(SearchError::ServiceUnavailable("unscripted call".into())),
        };
        papers.truncate(request.result_limit());
        Ok(papers)
    }
}

/// Chat model replaying scripted chunk sequences, one per call.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    scripts: Arc<Mutex<VecDeque<Vec<Result<String, ChatError>>>>>,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedModel {
    pub fn new(scripts: Vec<Vec<Result<String, ChatError>>>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChatModel for ScriptedModel {
    fn stream_chat(&self, messages: Vec<ChatMessage>) -> BoxStream<'_, Result<String, ChatError>> {
        self.calls.lock().unwrap().push(messages);
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        stream::iter(script).boxed()
    }
}

/// Chat model that writes a review from the papers it was handed, in small chunks.
#[derive(Clone, Default)]
pub struct ReviewWriterModel {
    received: Arc<Mutex<Vec<PaperRecord>>>,
}

impl ReviewWriterModel {
    pub fn received(&self) -> Vec<PaperRecord> {
        self.received.lock().unwrap().clone()
    }
}

impl ChatModel for ReviewWriterModel {
    fn stream_chat(&self, messages: Vec<ChatMessage>) -> BoxStream<'_, Result<String, ChatError>> {
        let papers: Vec<PaperRecord> = messages
            .iter()
            .filter(|m| m.name.as_deref() == Some(CANDIDATE_AGENT))
            .flat_map(|m| m.content.lines())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        let mut review = String::from("# Literature review\n\nAn introduction.\n\n");
        for p in &papers {
            review.push_str(&format!(
                "- [{}]({}) by {}: addresses a problem and contributes a method.\n",
                p.title,
                p.pdf_url,
                p.authors.join(", ")
            ));
        }
        review.push_str("\nIn short, the field is moving fast.");
        self.received.lock().unwrap().extend(papers);

        let chunks: Vec<Result<String, ChatError>> = review
            .chars()
            .collect::<Vec<_>>()
            .chunks(7)
            .map(|c| Ok(c.iter().collect()))
            .collect();
        stream::iter(chunks).boxed()
    }
}
