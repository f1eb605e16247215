//! ncr-predict - NCR category prediction
//!
//! Predicts the (defect, root cause, corrective action) triple for
//! non-conformance report descriptions, from the command line or as an HTTP
//! service.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ncr_common::config::{LoggingConfig, NcrConfig};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ncr_predict::api::model::ModelResponse;
use ncr_predict::artifacts::load_inference_context;
use ncr_predict::input::{read_batch_input, InputFormat};
use ncr_predict::llm::DashScopeClient;
use ncr_predict::{AppState, CascadeOrchestrator, CascadeSettings, PredictionReport};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ncr-predict", version, about = "NCR category prediction cascade")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact directory, overrides config and NCR_ARTIFACTS_DIR
    #[arg(long, global = true)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict each description, one JSON line per description
    Predict {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Predict every entry of a file, printed as a JSON array
    Batch {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = InputFormat::Lines)]
        format: InputFormat,

        /// Skip the first line (CSV header)
        #[arg(long)]
        skip_header: bool,
    },
    /// Run the HTTP service
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print label sets, thresholds and artifact provenance
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = NcrConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging)?;

    let artifacts_dir = cli
        .artifacts_dir
        .clone()
        .unwrap_or_else(|| config.artifacts_dir.clone());
    let cascade = Arc::new(build_cascade(&artifacts_dir, &config)?);

    match cli.command {
        Command::Predict { text } => {
            for description in &text {
                let trace = cascade.run(description)?;
                let report = PredictionReport::new(description, trace);
                println!("{}", serde_json::to_string(&report)?);
            }
        }
        Command::Batch {
            input,
            format,
            skip_header,
        } => {
            let items = read_batch_input(&input, format, skip_header)?;
            info!("Predicting {} descriptions from {}", items.len(), input.display());

            let descriptions: Vec<String> =
                items.iter().map(|item| item.description.clone()).collect();
            let traces = cascade.run_batch(&descriptions)?;
            let reports: Vec<PredictionReport> = items
                .into_iter()
                .zip(traces)
                .map(|(item, trace)| {
                    let report = PredictionReport::new(&item.description, trace);
                    match item.entities {
                        Some(entities) => report.with_entities(entities),
                        None => report,
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(cascade, &config, &host, port).await?;
        }
        Command::Inspect => {
            let model = ModelResponse::new(&cascade, config.llm.enabled);
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
    }

    Ok(())
}

/// Initialize tracing from the logging config
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("ncr_predict={0},ncr_common={0},tower_http={0}", logging.level).into()
    });

    let (file_layer, stderr_layer) = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file));
            (Some(layer), None)
        }
        None => (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

fn build_cascade(artifacts_dir: &Path, config: &NcrConfig) -> Result<CascadeOrchestrator> {
    info!("Loading model artifacts from {}", artifacts_dir.display());
    let context = load_inference_context(artifacts_dir).with_context(|| {
        format!(
            "Failed to load model artifacts from {}",
            artifacts_dir.display()
        )
    })?;

    let settings = CascadeSettings::from(&config.cascade);
    info!(
        "Cascade ready: unknown threshold {:.2}, gate min length {}, min alpha ratio {:.2}",
        settings.unknown_threshold,
        settings.gate.min_text_length(),
        settings.gate.min_alpha_ratio()
    );
    Ok(CascadeOrchestrator::new(Arc::new(context), settings))
}

async fn serve(
    cascade: Arc<CascadeOrchestrator>,
    config: &NcrConfig,
    host: &str,
    port: u16,
) -> Result<()> {
    let mut state = AppState::new(cascade);
    if config.llm.enabled {
        let client = DashScopeClient::new(&config.llm).context("Failed to configure LLM fallback")?;
        info!("LLM fallback enabled: model {} at {}", client.model(), client.endpoint());
        state = state.with_llm(Arc::new(client));
    }

    let app = ncr_predict::build_router(state);

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(addr) => addr,
        Err(e) => bail!("Invalid listen address {}:{}: {}", host, port, e),
    };

    info!("Starting ncr-predict v{} on http://{}", env!("CARGO_PKG_VERSION"), addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
