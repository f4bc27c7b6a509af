use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::search::{DEFAULT_MAX_LABELS, DEFAULT_SUGGESTION_LIMIT, EngineConfig};
use crate::translate::client::DEFAULT_BASE_URL;

const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Weekly job-posting volumes by profession across the English and Swedish indexes.
#[derive(Parser, Debug)]
#[command(name = "jobtrends", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the MCP server on stdio (default)
    Serve,
    /// Resolve one profession query and print the outcome as JSON
    Query {
        query: String,
        /// Skip the too-general check
        #[arg(long)]
        refined: bool,
    },
    /// Resolve up to two profession queries together
    Compare {
        #[arg(required = true, num_args = 1..=2)]
        queries: Vec<String>,
        /// Per-query refined flag, in query order (e.g. --refined true --refined false)
        #[arg(long)]
        refined: Vec<bool>,
    },
    /// Suggest catalog labels for a Swedish fragment
    Suggest {
        fragment: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Args, Debug)]
pub struct Settings {
    /// Postgres connection string for the posting store
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// LibreTranslate-compatible endpoint
    #[arg(long, env = "TRANSLATE_URL", default_value = DEFAULT_BASE_URL, value_parser = parse_base_url)]
    pub translate_url: String,

    #[arg(long, env = "TRANSLATE_API_KEY", hide_env_values = true)]
    pub translate_api_key: Option<String>,

    /// Matching label count at which a query is too general
    #[arg(long, env = "JOBTRENDS_MAX_LABELS", default_value_t = DEFAULT_MAX_LABELS, value_parser = parse_positive)]
    pub max_labels: usize,

    #[arg(long, env = "JOBTRENDS_SUGGESTION_LIMIT", default_value_t = DEFAULT_SUGGESTION_LIMIT, value_parser = parse_positive)]
    pub suggestion_limit: usize,

    /// Timeout in seconds for each external call
    #[arg(long, env = "JOBTRENDS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout_secs: u64,

    /// Also write daily-rotated log files here
    #[arg(long, env = "JOBTRENDS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_labels: self.max_labels,
            suggestion_limit: self.suggestion_limit,
            timeout: self.timeout(),
        }
    }
}

fn parse_base_url(s: &str) -> Result<String, String> {
    let url = url::Url::parse(s).map_err(|e| format!("invalid URL '{s}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(s.trim_end_matches('/').to_string()),
        other => Err(format!("URL must use http or https, got '{other}'")),
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
