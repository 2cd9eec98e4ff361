use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpQuizApi, SessionController};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod ui;

use config::{load_settings, validate, DEFAULT_CONFIG_PATH};

/// Terminal personality quiz backed by a scenario generation service.
#[derive(Parser, Debug)]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    backend_url: Option<String>,
    /// Number of scenarios per round.
    #[arg(long)]
    questions: Option<usize>,
    /// Per-request timeout; unset means wait for the transport.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings(&args.config)?;
    if let Some(v) = args.backend_url {
        settings.backend_url = v;
    }
    if let Some(v) = args.questions {
        settings.total_questions = v;
    }
    if let Some(v) = args.timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    let settings = validate(settings)?;
    info!(
        backend_url = %settings.backend_url,
        total_questions = settings.total_questions,
        timeout_secs = ?settings.request_timeout_secs,
        "starting quiz"
    );

    let api = match settings.request_timeout() {
        Some(timeout) => HttpQuizApi::with_timeout(&settings.backend_url, timeout)
            .context("failed to build http client")?,
        None => HttpQuizApi::new(&settings.backend_url),
    };
    let mut controller = SessionController::new(Arc::new(api), settings.total_questions);

    let outcome = ui::run(&mut controller).await;
    controller.flush_pending_save().await;
    outcome
}
