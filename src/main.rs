//! CLI entry point for the chat log downloader.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chatlog_core::{
    ArtifactSink, BackendConfig, DirectorySink, FormState, HttpBackend, Materializer,
    Orchestrator, StdoutSink, SubmitOutcome,
};
use clap::Parser;
use tracing::{debug, info, warn};

mod cli;
mod progress;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    // Args carries the token, so only the non-secret fields are logged.
    debug!(
        room = %args.room,
        count = %args.count,
        backend_url = %args.backend_url,
        stdout = args.stdout,
        "CLI arguments parsed"
    );

    let config = BackendConfig::new(&args.backend_url)
        .and_then(|config| config.with_connect_timeout_secs(args.connect_timeout))
        .and_then(|config| config.with_request_timeout_secs(args.request_timeout))
        .context("invalid backend configuration")?;
    let backend = HttpBackend::new(&config).context("failed to build HTTP client")?;
    info!(endpoint = %backend.endpoint(), "Chat log downloader starting");

    let mut form = FormState::new();
    form.set_credential(args.token.as_str());
    form.set_room_id(args.room.as_str());
    form.set_message_count(&args.count);

    let message_count = form.message_count();
    if !message_count.is_within_advised_range() {
        warn!(
            message_count = message_count.get(),
            "message count is outside the advised 1-1000 range"
        );
    }

    let sink: Arc<dyn ArtifactSink> = if args.stdout {
        Arc::new(StdoutSink)
    } else {
        Arc::new(DirectorySink::new(&args.output_dir))
    };
    let orchestrator = Orchestrator::new(Arc::new(backend), Materializer::new(sink));

    let spinner = progress::start_spinner(args.quiet);
    let outcome = orchestrator.submit(form.snapshot()).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        SubmitOutcome::Saved(saved) => {
            if !args.quiet {
                eprintln!("Saved {saved}");
            }
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Failed(category) => {
            eprintln!("{}", category.message());
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::Busy => {
            warn!("download already in progress");
            Ok(ExitCode::FAILURE)
        }
    }
}
