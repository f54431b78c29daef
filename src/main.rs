mod arxiv;
mod cli;
mod config;
mod markdown;
mod openai;
mod pipeline;
mod team;
#[cfg(test)]
mod test_support;

pub const USER_AGENT: &str = concat!("litreview/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::Parser;
use futures::StreamExt;
use reqwest::Client;
use tracing::{info, warn};

use arxiv::{ArxivClient, PaperSearch, SearchRequest};
use cli::Cli;
use config::ReviewConfig;
use openai::{ChatError, OpenAiClient};
use pipeline::{ReviewError, ReviewPipeline};
use team::{AgentTeam, Summarizer};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest gap between reads of a response body, including streamed completions.
const READ_TIMEOUT: Duration = Duration::from_secs(90);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("litreview=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = ReviewConfig::new(cli.candidates, cli.max_turns)?;

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build()?;
    let arxiv = match cli.arxiv_url.as_deref() {
        Some(url) => ArxivClient::with_base_url(http.clone(), url),
        None => ArxivClient::new(http.clone()),
    };

    if cli.list {
        let (topic, count) = resolve_request(&cli)?;
        return list_papers(&arxiv, &topic, count).await;
    }

    let api_key = cli.api_key.as_deref().ok_or(ChatError::ApiKeyNotSet)?;
    let mut model = OpenAiClient::new(http, api_key, &cli.model)?;
    if let Some(url) = cli.openai_base_url.as_deref() {
        model = model.with_base_url(url);
    }

    let (topic, count) = resolve_request(&cli)?;
    let paper_count = count.unwrap_or(cli.default_paper_count());

    info!(model = %model.model(), "starting litreview");
    let team = AgentTeam::review_team(model, config.max_turns());
    let pipeline = ReviewPipeline::new(arxiv, team, config);

    println!("\nStarting literature review for topic: '{topic}' (num_papers={paper_count})\n");

    tokio::select! {
        result = print_review(&pipeline, &topic, paper_count) => result?,
        _ = tokio::signal::ctrl_c() => warn!("interrupted, review abandoned"),
    }
    Ok(())
}

fn resolve_request(cli: &Cli) -> std::io::Result<(String, Option<usize>)> {
    cli.resolve_request(&mut std::io::stdin().lock(), &mut std::io::stdout())
}

async fn print_review<S: PaperSearch, Z: Summarizer>(
    pipeline: &ReviewPipeline<S, Z>,
    topic: &str,
    paper_count: usize,
) -> Result<(), ReviewError> {
    let lines = pipeline.generate_review(topic, paper_count);
    futures::pin_mut!(lines);

    while let Some(line) = lines.next().await {
        println!("{}", line?);
    }
    Ok(())
}

async fn list_papers(
    client: &ArxivClient,
    topic: &str,
    count: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = match count {
        Some(n) => SearchRequest::new(topic, n)?,
        None => SearchRequest::with_default_limit(topic)?,
    };
    let papers = client.search(&request).await?;
    info!(papers = papers.len(), "search complete");
    let listing = arxiv::format::format_paper_list(request.query(), &papers);
    print!("{listing}");
    Ok(())
}
