//! `scanfill` command-line entry point.
//!
//! Wires the pipeline together: config, logging, the browser-backed page,
//! the recognition client, and the orchestrator that runs them.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use scanfill_browser::CdpPage;
use scanfill_config::{config_dir, config_file_path, load_and_prepare, write_config, ScanfillConfig};
use scanfill_core::{RunEvent, RunState};
use scanfill_locator::ImageLocator;
use scanfill_logging::init_logger;
use scanfill_notify::NotificationPresenter;
use scanfill_orchestrator::{ProcessOrchestrator, TriggerOutcome};
use scanfill_recognition::RecognitionClient;

#[derive(Parser)]
#[command(name = "scanfill")]
#[command(about = "Scanfill — OCR-driven form autofill for operator workflows")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one extraction pass against the attached page
    Fill {
        /// DevTools WebSocket address of the tab carrying the form
        #[arg(long)]
        page_ws: Option<String>,
        /// Recognition service endpoint override
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Probe the recognition service's health endpoint
    Check,
    /// Print the active field mapping
    Mapping,
    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = config_file_path(&config_dir());
    let config = load_and_prepare(&config_path).await?;
    init_logger(config.logging.dir.as_deref(), &config.logging.level);

    match cli.command {
        Commands::Fill { page_ws, endpoint } => fill(config, page_ws, endpoint).await,
        Commands::Check => check(config).await,
        Commands::Mapping => {
            for entry in config.fields.entries() {
                println!("{:<16} -> #{}", entry.key, entry.target);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init => {
            write_config(&ScanfillConfig::default(), &config_path).await?;
            println!("Wrote default config to {}", config_path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn fill(
    mut config: ScanfillConfig,
    page_ws: Option<String>,
    endpoint: Option<String>,
) -> Result<ExitCode> {
    if let Some(endpoint) = endpoint.or_else(|| std::env::var("SCANFILL_ENDPOINT").ok()) {
        config.recognition.endpoint = endpoint;
    }
    let ws_endpoint = page_ws
        .or_else(|| std::env::var("SCANFILL_PAGE_WS").ok())
        .or(config.page.ws_endpoint)
        .context("no page WebSocket configured; pass --page-ws or set page.ws_endpoint")?;

    let page = Arc::new(CdpPage::attach(&ws_endpoint).await?);
    let recognizer = Arc::new(RecognitionClient::new(&config.recognition));

    let (events_tx, events_rx) = mpsc::channel::<RunEvent>(64);
    let audit = tokio::spawn(log_events(events_rx));

    let orchestrator = ProcessOrchestrator::new(
        page,
        recognizer,
        ImageLocator::new(config.image),
        NotificationPresenter::new(&config.notify),
        config.fields,
    )
    .with_events(events_tx);

    let outcome = orchestrator.trigger().await;
    drop(orchestrator);
    let _ = audit.await;

    match outcome {
        TriggerOutcome::Completed(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            match report.state {
                RunState::Succeeded => Ok(ExitCode::SUCCESS),
                _ => Ok(ExitCode::FAILURE),
            }
        }
        // Unreachable with a freshly built orchestrator; report it anyway.
        TriggerOutcome::AlreadyRunning => {
            println!("a run is already in progress");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn check(config: ScanfillConfig) -> Result<ExitCode> {
    let client = RecognitionClient::new(&config.recognition);
    match client.check_health().await {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!(
                "recognition service unreachable at {}: {err:#}",
                config.recognition.endpoint
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Drains the orchestrator's audit channel into the structured log.
async fn log_events(mut events_rx: mpsc::Receiver<RunEvent>) {
    while let Some(event) = events_rx.recv().await {
        info!(
            run_id = %event.run_id,
            kind = %event.kind,
            payload = %event.payload,
            "Run event"
        );
    }
}
