use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing::warn;

use crate::arxiv::types::DEFAULT_RESULT_LIMIT;
use crate::config::{DEFAULT_CANDIDATE_CEILING, DEFAULT_MAX_TURNS, DEFAULT_PAPER_COUNT};
use crate::openai::DEFAULT_MODEL;

/// Search arXiv and stream a Markdown literature review written by a two-agent team.
///
/// Configuration via environment variables:
/// - `OPENAI_API_KEY`: language-model credential (required unless `--list`)
/// - `OPENAI_MODEL`, `OPENAI_BASE_URL`, `ARXIV_API_URL`: optional overrides
#[derive(Parser, Debug)]
#[command(name = "litreview", version, about)]
pub struct Cli {
    /// Review topic; prompted for when omitted
    pub topic: Option<String>,

    /// Number of papers to review (default: 5, or 10 with --list)
    #[arg(short = 'n', long)]
    pub papers: Option<String>,

    /// Only search arXiv and print the ranked papers
    #[arg(long)]
    pub list: bool,

    /// Candidates fetched from arXiv before selecting the top papers (1-50)
    #[arg(long, default_value_t = DEFAULT_CANDIDATE_CEILING)]
    pub candidates: usize,

    /// Turn budget for the agent team
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    pub max_turns: usize,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "ARXIV_API_URL")]
    pub arxiv_url: Option<String>,
}

impl Cli {
    /// Paper count used when none is given: a review covers 5 papers, a listing 10.
    pub fn default_paper_count(&self) -> usize {
        if self.list {
            DEFAULT_RESULT_LIMIT
        } else {
            DEFAULT_PAPER_COUNT
        }
    }

    /// Resolve topic and paper count from arguments, prompting for what is missing.
    /// A `None` count means the caller should use its default.
    pub fn resolve_request(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> io::Result<(String, Option<usize>)> {
        let given_topic = self
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let topic = match given_topic {
            Some(t) => t.to_string(),
            None => prompt_topic(input, output)?,
        };

        let default = self.default_paper_count();
        let count = match (&self.papers, given_topic.is_some()) {
            (Some(raw), _) => paper_count_or_default(raw, default, output)?,
            (None, true) => None,
            (None, false) => prompt_paper_count(default, input, output)?,
        };

        Ok((topic, count))
    }
}

/// Keep prompting until a non-empty topic is entered.
pub fn prompt_topic(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<String> {
    loop {
        write!(output, "Enter topic for literature review (required): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no topic provided",
            ));
        }

        let topic = line.trim();
        if !topic.is_empty() {
            return Ok(topic.to_string());
        }
        writeln!(output, "Topic cannot be empty. Please enter a topic.")?;
    }
}

pub fn prompt_paper_count(
    default: usize,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<Option<usize>> {
    write!(output, "How many papers do you want? [default {default}]: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    paper_count_or_default(&line, default, output)
}

fn paper_count_or_default(
    raw: &str,
    default: usize,
    output: &mut impl Write,
) -> io::Result<Option<usize>> {
    match parse_paper_count(raw) {
        Ok(count) => Ok(count),
        Err(e) => {
            warn!(error = %e, "invalid paper count");
            writeln!(
                output,
                "Invalid number entered, defaulting to {default} papers."
            )?;
            Ok(None)
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("paper count must be a positive integer, got '{0}'")]
pub struct InvalidPaperCount(String);

/// Blank input means "use the default"; anything else must be a positive integer.
pub fn parse_paper_count(raw: &str) -> Result<Option<usize>, InvalidPaperCount> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(InvalidPaperCount(raw.to_string())),
    }
}
