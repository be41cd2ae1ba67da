use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prospector::config::Settings;
use prospector::consts::{DESCRIPTION, SHUTDOWN_GRACE, VERSION};
use prospector::executor::TaskExecutor;
use prospector::planner::telex::TelexPlanner;
use prospector::queue;
use prospector::search::google::GoogleSearch;
use prospector::server::{self, AppState};
use prospector::webhook::http::HttpNotifier;

#[derive(Parser)]
#[command(name = "prospector", version, about = DESCRIPTION)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on [env: PORT, default: 4000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of background workers (overrides PROSPECTOR_WORKERS)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Load settings from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let mut settings = Settings::from_env()?;
    if let Some(workers) = cli.workers {
        if workers == 0 {
            bail!("--workers must be at least 1");
        }
        settings.workers = workers;
    }
    settings.log_json |= cli.log_json;

    init_tracing(&settings);
    info!(version = VERSION, model = %settings.ai_model, "prospector starting");

    let port = cli.port.unwrap_or(settings.port);

    let client = reqwest::Client::new();
    let planner = Arc::new(TelexPlanner::from_settings(client.clone(), &settings));
    let search = Arc::new(GoogleSearch::from_settings(client.clone(), &settings));
    let notifier = Arc::new(HttpNotifier::new(client));
    let executor = Arc::new(
        TaskExecutor::new(planner, search, notifier).with_search_pause(settings.search_pause),
    );

    let (task_queue, pool) = queue::start(settings.queue_capacity, settings.workers, executor);
    info!(
        workers = pool.len(),
        capacity = settings.queue_capacity,
        "worker pool started"
    );

    let state = Arc::new(AppState {
        queue: task_queue,
        default_api_key: settings.default_api_key.clone(),
    });
    let app = server::build(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cli.host, port))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last queue sender) is gone; let the
    // workers finish what was already accepted.
    if pool.drain(SHUTDOWN_GRACE).await {
        info!("all queued tasks finished");
    } else {
        warn!("shutdown grace expired with tasks still running");
    }

    info!("prospector stopped");
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match settings.log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: PROSPECTOR_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    settings.log_level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if settings.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; draining");
}
