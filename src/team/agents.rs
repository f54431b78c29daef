use futures::StreamExt;
use futures::stream::{self, BoxStream};

use super::{Agent, AgentError, Transcript};
use crate::openai::{ChatMessage, ChatModel};

pub const CANDIDATE_AGENT: &str = "search_agent";
pub const SUMMARIZER_AGENT: &str = "summarizer";

const SUMMARIZER_SYSTEM_PROMPT: &str = "Act as an expert academic researcher. \
You are provided with a list of papers as JSON, one object per line. \
Provide a Markdown literature review with:\n\
  1) A 4 sentence introduction to the topic.\n\
  2) One bullet per paper containing: title (Markdown link to pdf_url), authors, \
the specific problem addressed, and the main contribution.\n\
  3) A one-sentence takeaway conclusion.";

pub fn task_prompt(topic: &str, paper_count: usize) -> String {
    format!(
        "You are a research assistant for a professor. Perform a literature review on \
         **{topic}** and return exactly {paper_count} relevant papers."
    )
}

/// Hands the already-selected papers to the next participant as JSON Lines.
pub struct CandidateAgent;

impl Agent for CandidateAgent {
    fn name(&self) -> &str {
        CANDIDATE_AGENT
    }

    fn respond<'a>(
        &'a self,
        transcript: &'a Transcript,
    ) -> BoxStream<'a, Result<String, AgentError>> {
        let lines: Vec<Result<String, AgentError>> = transcript
            .papers
            .iter()
            .map(|paper| {
                serde_json::to_string(paper)
                    .map(|json| json + "\n")
                    .map_err(AgentError::from)
            })
            .collect();

        if lines.is_empty() {
            return stream::iter(vec![Ok("[]\n".to_string())]).boxed();
        }
        stream::iter(lines).boxed()
    }
}

/// Writes the review from the conversation so far using a chat model.
pub struct SummarizerAgent<M> {
    model: M,
}

impl<M: ChatModel> SummarizerAgent<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    fn build_messages(&self, transcript: &Transcript) -> Vec<ChatMessage> {
        let mut messages = vec![
            ChatMessage::system(SUMMARIZER_SYSTEM_PROMPT),
            ChatMessage::user(transcript.task.clone()),
        ];
        for spoken in &transcript.messages {
            let message = if spoken.source == self.name() {
                ChatMessage::assistant(spoken.content.clone())
            } else {
                ChatMessage::user(spoken.content.clone())
            };
            messages.push(message.named(&spoken.source));
        }
        messages
    }
}

impl<M: ChatModel> Agent for SummarizerAgent<M> {
    fn name(&self) -> &str {
        SUMMARIZER_AGENT
    }

    fn respond<'a>(
        &'a self,
        transcript: &'a Transcript,
    ) -> BoxStream<'a, Result<String, AgentError>> {
        let messages = self.build_messages(transcript);
        self.model
            .stream_chat(messages)
            .map(|chunk| chunk.map_err(AgentError::from))
            .boxed()
    }
}
