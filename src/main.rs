mod catalog;
mod config;
mod search;
mod store;
mod tools;
mod translate;

pub const USER_AGENT: &str = concat!("jobtrends/", env!("CARGO_PKG_VERSION"));

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use rmcp::{ServiceExt, transport::stdio};
use serde::Serialize;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder as RollingBuilder, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::{Cli, Command};
use search::QueryEngine;
use store::PgStore;
use tools::JobTrends;
use translate::LibreTranslateClient;

/// TCP connection establishment timeout for the translator.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const LOG_FILES_KEPT: usize = 14;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.settings.log_dir.as_deref())?;

    let settings = &cli.settings;
    let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let translator = LibreTranslateClient::new(
        http,
        &settings.translate_url,
        settings.translate_api_key.clone(),
        settings.timeout(),
    );
    let store = PgStore::connect(&settings.database_url, settings.timeout())
        .await
        .inspect_err(|e| error!("posting store unavailable: {e}"))?;
    let engine = QueryEngine::start(store, translator, settings.engine_config())
        .await
        .inspect_err(|e| error!("failed to start query engine: {e}"))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("starting jobtrends MCP server");
            let service = JobTrends::new(Arc::new(engine))
                .serve(stdio())
                .await
                .inspect_err(|e| error!("failed to start server: {e}"))?;
            service.waiting().await?;
            info!("server stopped");
        }
        Command::Query { query, refined } => {
            print_json(&engine.resolve_query(&query, refined).await?)?;
        }
        Command::Compare { queries, refined } => {
            print_json(&engine.resolve_many(&queries, &refined).await?)?;
        }
        Command::Suggest { fragment, limit } => {
            print_json(&engine.suggest(&fragment, limit).await)?;
        }
    }
    Ok(())
}

/// Logs go to stderr (stdout carries the MCP transport) and, when `log_dir`
/// is set, to a daily-rotated file as well.
fn init_tracing(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env().add_directive("jobtrends=info".parse()?);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingBuilder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix("jobtrends")
                .filename_suffix("log")
                .max_log_files(LOG_FILES_KEPT)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(guard)
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
