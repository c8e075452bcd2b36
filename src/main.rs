//! Matchscore CLI entrypoint.

mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mimalloc::MiMalloc;

use matchscore::config::Config;
use matchscore::embedding::{EmbeddingGateway, HttpEmbeddingGateway, StubEmbeddingGateway};
use matchscore::scoring::ScoringOrchestrator;

use crate::cli::{Cli, read_text};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const EXIT_UNAVAILABLE: u8 = 2;
const EXIT_REJECTED: u8 = 3;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate()?;

    let candidate = read_text(&cli.candidate)?;
    let target = read_text(&cli.target)?;
    let keywords = cli.keyword_list()?;

    tracing::info!(
        candidate = %cli.candidate.display(),
        target = %cli.target.display(),
        keywords = keywords.len(),
        "Matchscore starting"
    );

    match config.http_gateway_config() {
        Some(http_config) => {
            let gateway = HttpEmbeddingGateway::new(http_config)
                .context("Failed to build embedding HTTP client")?;
            run(gateway, &config, &cli, &candidate, &target, &keywords).await
        }
        None => {
            tracing::warn!(
                "No MATCHSCORE_EMBEDDING_URL configured, using offline stub embeddings"
            );
            let gateway = StubEmbeddingGateway::new();
            run(gateway, &config, &cli, &candidate, &target, &keywords).await
        }
    }
}

async fn run<G: EmbeddingGateway>(
    gateway: G,
    config: &Config,
    cli: &Cli,
    candidate: &str,
    target: &str,
    keywords: &[String],
) -> Result<ExitCode> {
    let orchestrator = ScoringOrchestrator::from_config(gateway, config);

    let outcome = orchestrator.score(candidate, target, keywords).await;

    if cli.stats {
        let stats = serde_json::to_string_pretty(&orchestrator.statistics())?;
        eprintln!("{stats}");
    }

    match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_unavailable() => {
            tracing::error!(error = %e, "Scoring failed");
            eprintln!("service temporarily unavailable, retry");
            Ok(ExitCode::from(EXIT_UNAVAILABLE))
        }
        Err(e) => {
            tracing::error!(error = %e, "Scoring input rejected");
            eprintln!("input rejected by embedding service: {e}");
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}
