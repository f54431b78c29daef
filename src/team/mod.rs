//! Two-agent review team: a candidate agent hands the selected papers to a
//! summarizer agent, taking turns round-robin until the turn budget is spent.

pub mod agents;

use std::fmt;

use async_stream::stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::{debug, info};

use crate::arxiv::PaperRecord;
use crate::openai::{ChatError, ChatModel};
use agents::{CandidateAgent, SummarizerAgent, task_prompt};

/// One labeled output line, rendered as `source: content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLine {
    pub source: String,
    pub content: String,
}

impl ReviewLine {
    pub fn new(source: &str, content: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            content: content.into(),
        }
    }
}

impl fmt::Display for ReviewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.content)
    }
}

/// Output of the summarization collaborator.
#[derive(Debug)]
pub enum TeamEvent {
    Line(ReviewLine),
    Completed { turns: usize },
    Failed(SummarizationError),
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ChatError),

    #[error("could not encode paper payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizationError {
    #[error("agent '{agent}' failed: {source}")]
    Agent {
        agent: String,
        #[source]
        source: AgentError,
    },

    #[error("summarization ended without a completion signal")]
    Incomplete,
}

/// A message already spoken in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub source: String,
    pub content: String,
}

/// Shared conversation state handed to each agent on its turn.
#[derive(Debug)]
pub struct Transcript {
    pub task: String,
    pub papers: Vec<PaperRecord>,
    pub messages: Vec<TranscriptMessage>,
}

impl Transcript {
    pub fn new(topic: &str, papers: Vec<PaperRecord>) -> Self {
        Self {
            task: task_prompt(topic, papers.len()),
            papers,
            messages: Vec::new(),
        }
    }

    fn push(&mut self, source: &str, content: String) {
        self.messages.push(TranscriptMessage {
            source: source.to_string(),
            content,
        });
    }
}

pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Stream this agent's reply for the current turn as text chunks.
    fn respond<'a>(
        &'a self,
        transcript: &'a Transcript,
    ) -> BoxStream<'a, Result<String, AgentError>>;
}

/// The summarization collaborator: turns a bounded paper set into labeled lines.
pub trait Summarizer {
    fn summarize(&self, topic: &str, papers: Vec<PaperRecord>) -> BoxStream<'_, TeamEvent>;
}

/// Round-robin group of agents with a fixed turn budget.
pub struct AgentTeam {
    participants: Vec<Box<dyn Agent>>,
    max_turns: usize,
}

impl AgentTeam {
    pub fn new(participants: Vec<Box<dyn Agent>>, max_turns: usize) -> Self {
        Self {
            participants,
            max_turns,
        }
    }

    /// `search_agent` hands off the papers, `summarizer` writes the review.
    pub fn review_team<M: ChatModel + 'static>(model: M, max_turns: usize) -> Self {
        Self::new(
            vec![
                Box::new(CandidateAgent) as Box<dyn Agent>,
                Box::new(SummarizerAgent::new(model)),
            ],
            max_turns,
        )
    }
}

impl Summarizer for AgentTeam {
    fn summarize(&self, topic: &str, papers: Vec<PaperRecord>) -> BoxStream<'_, TeamEvent> {
        let mut transcript = Transcript::new(topic, papers);

        Box::pin(stream! {
            let turns = if self.participants.is_empty() { 0 } else { self.max_turns };

            for turn in 0..turns {
                let agent = &self.participants[turn % self.participants.len()];
                info!(agent = agent.name(), turn = turn + 1, "team:turn");

                let mut splitter = LineSplitter::default();
                let mut message = String::new();
                let mut failure = None;
                {
                    let mut chunks = agent.respond(&transcript);
                    while let Some(chunk) = chunks.next().await {
                        match chunk {
                            Ok(text) => {
                                message.push_str(&text);
                                for line in splitter.push(&text) {
                                    yield TeamEvent::Line(ReviewLine::new(agent.name(), line));
                                }
                            }
                            Err(e) => {
                                failure = Some(e);
                                break;
                            }
                        }
                    }
                }

                if let Some(source) = failure {
                    yield TeamEvent::Failed(SummarizationError::Agent {
                        agent: agent.name().to_string(),
                        source,
                    });
                    return;
                }

                if let Some(rest) = splitter.finish() {
                    yield TeamEvent::Line(ReviewLine::new(agent.name(), rest));
                }
                debug!(agent = agent.name(), chars = message.len(), "turn complete");
                transcript.push(agent.name(), message);
            }

            yield TeamEvent::Completed { turns };
        })
    }
}

/// Reassembles streamed text chunks into complete lines.
#[derive(Debug, Default)]
struct LineSplitter {
    buf: String,
}

impl LineSplitter {
    fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buf.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        let rest = rest.trim_end_matches('\r');
        (!rest.is_empty()).then(|| rest.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedModel, paper};
    use futures::stream;

    struct Echo(&'static str);

    impl Agent for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn respond<'a>(
            &'a self,
            transcript: &'a Transcript,
        ) -> BoxStream<'a, Result<String, AgentError>> {
            let text = format!("turn {} of {}\n", transcript.messages.len() + 1, self.0);
            stream::iter(vec![Ok(text)]).boxed()
        }
    }

    async fn run(team: &AgentTeam, papers: Vec<PaperRecord>) -> Vec<TeamEvent> {
        let events = team.summarize("graph neural networks", papers);
        events.collect().await
    }

    fn lines(events: &[TeamEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                TeamEvent::Line(line) => Some(line.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn splitter_joins_chunks_into_lines() {
        let mut s = LineSplitter::default();
        assert!(s.push("# Rev").is_empty());
        assert_eq!(s.push("iew\r\n\n- a"), vec!["# Review", ""]);
        assert_eq!(s.push("\n- b"), vec!["- a"]);
        assert_eq!(s.finish().as_deref(), Some("- b"));
        assert_eq!(s.finish(), None);
    }

    #[test]
    fn review_line_displays_with_source_label() {
        let line = ReviewLine::new("summarizer", "- [A](u)");
        assert_eq!(line.to_string(), "summarizer: - [A](u)");
    }

    #[tokio::test]
    async fn round_robin_respects_turn_limit() {
        let team = AgentTeam::new(
            vec![Box::new(Echo("a")) as Box<dyn Agent>, Box::new(Echo("b"))],
            3,
        );
        let events = run(&team, vec![]).await;

        assert_eq!(
            lines(&events),
            vec!["a: turn 1 of a", "b: turn 2 of b", "a: turn 3 of a"]
        );
        assert!(matches!(
            events.last(),
            Some(TeamEvent::Completed { turns: 3 })
        ));
    }

    #[tokio::test]
    async fn empty_team_completes_immediately() {
        let team = AgentTeam::new(vec![], 2);
        let events = run(&team, vec![]).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TeamEvent::Completed { turns: 0 }));
    }

    #[tokio::test]
    async fn review_team_hands_papers_to_summarizer() {
        let model = ScriptedModel::new(vec![vec![
            Ok("# Review\n- one".into()),
            Ok("\nDone.".into()),
        ]]);
        let team = AgentTeam::review_team(model.clone(), 2);
        let events = run(&team, vec![paper("Alpha"), paper("Beta")]).await;

        let out = lines(&events);
        assert!(out[0].starts_with("search_agent: {"));
        assert!(out[0].contains("\"title\":\"Alpha\""));
        assert!(out[1].contains("\"title\":\"Beta\""));
        assert_eq!(
            out[2..].join("\n"),
            "summarizer: # Review\nsummarizer: - one\nsummarizer: Done."
        );
        assert!(matches!(
            events.last(),
            Some(TeamEvent::Completed { turns: 2 })
        ));

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        let handoff = calls[0]
            .iter()
            .find(|m| m.name.as_deref() == Some("search_agent"))
            .unwrap();
        assert_eq!(handoff.content.lines().count(), 2);
    }

    #[tokio::test]
    async fn model_failure_stops_team_after_partial_output() {
        let model = ScriptedModel::new(vec![vec![
            Ok("# Review\n".into()),
            Err(ChatError::RateLimited),
        ]]);
        let team = AgentTeam::review_team(model, 2);
        let events = run(&team, vec![paper("Alpha")]).await;

        assert!(lines(&events).contains(&"summarizer: # Review".to_string()));
        match events.last() {
            Some(TeamEvent::Failed(SummarizationError::Agent { agent, .. })) => {
                assert_eq!(agent, "summarizer");
            }
            other => panic!("expected Failed, got: {other:?}"),
        }
        let completed = events
            .iter()
            .any(|e| matches!(e, TeamEvent::Completed { .. }));
        assert!(!completed);
    }
}
