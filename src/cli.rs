//! Command-line arguments and keyword-list normalization.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "matchscore")]
#[command(author, version, about = "Score a candidate text against a target text", long_about = None)]
pub struct Cli {
    /// File holding the candidate text (e.g. a resume)
    #[arg(short, long, value_name = "FILE")]
    pub candidate: PathBuf,

    /// File holding the target text (e.g. a job description)
    #[arg(short, long, value_name = "FILE")]
    pub target: PathBuf,

    /// Keywords separated by commas, semicolons or newlines
    #[arg(short, long, value_name = "LIST")]
    pub keywords: Option<String>,

    /// File with keywords, same separators as --keywords
    #[arg(long, value_name = "FILE")]
    pub keywords_file: Option<PathBuf>,

    /// Also print engine statistics to stderr
    #[arg(long)]
    pub stats: bool,
}

impl Cli {
    /// Collects keywords from `--keywords` and `--keywords-file`, in that order.
    pub fn keyword_list(&self) -> Result<Vec<String>> {
        let mut keywords = self
            .keywords
            .as_deref()
            .map(parse_keyword_list)
            .unwrap_or_default();

        if let Some(path) = &self.keywords_file {
            keywords.extend(parse_keyword_list(&read_text(path)?));
        }

        Ok(keywords)
    }
}

/// Reads a UTF-8 text file.
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Splits a delimited keyword string into the canonical list.
///
/// Separators are `,`, `;` and newlines. Entries are trimmed and empty ones dropped.
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split([',', ';', '\n', '\r'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
