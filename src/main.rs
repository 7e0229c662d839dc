#![forbid(unsafe_code)]

//! `group-organizer`: Slack group organizer bot binary.
//!
//! Bootstraps configuration, the durable state stores, the reminder
//! scheduler, the Slack Socket Mode integration, and the health endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use group_organizer::app::AppState;
use group_organizer::clock::{Clock, SystemClock};
use group_organizer::config::GlobalConfig;
use group_organizer::health;
use group_organizer::models::poll::PollBook;
use group_organizer::persistence::StateStores;
use group_organizer::scheduler::{consumer, ReminderScheduler};
use group_organizer::slack::client::SlackService;
use group_organizer::{AppError, Result};

const REMINDER_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "group-organizer", about = "Slack group organizer bot", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the directory holding the state records.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("group-organizer bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    config.load_credentials().await?;

    let config = Arc::new(config);
    info!(
        data_dir = %config.data_dir.display(),
        timezone = %config.tz(),
        per_channel_state = config.per_channel_state,
        "configuration loaded"
    );

    // ── Core services ───────────────────────────────────
    let ct = CancellationToken::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (reminder_tx, reminder_rx) = mpsc::channel(REMINDER_EVENT_CAPACITY);
    let scheduler = ReminderScheduler::new(config.tz(), Arc::clone(&clock), reminder_tx, ct.clone());
    let stores = StateStores::new(Arc::clone(&config), clock);

    let (slack, queue_handle) = SlackService::start(&config.slack).map_err(|err| {
        error!(%err, "slack service start failed");
        err
    })?;
    let slack = Arc::new(slack);

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        stores,
        scheduler,
        polls: Mutex::new(PollBook::new(config.max_open_polls)),
        slack: Some(Arc::clone(&slack)),
    });

    // ── Background tasks ────────────────────────────────
    let socket_handle = slack.spawn_socket_mode(Arc::clone(&state));
    let consumer_handle =
        consumer::spawn_reminder_consumer(reminder_rx, Arc::clone(&slack), ct.clone());

    let health_handle = if config.http_port == 0 {
        info!("health endpoint disabled");
        None
    } else {
        let health_ct = ct.clone();
        let port = config.http_port;
        Some(tokio::spawn(async move {
            if let Err(err) = health::serve_health(port, health_ct).await {
                error!(%err, "health endpoint failed");
            }
        }))
    };

    info!("group-organizer ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");

    let dropped = state.scheduler.pending_count();
    if dropped > 0 {
        warn!(dropped, "pending reminders are not persisted and will be lost");
    }
    ct.cancel();

    let _ = consumer_handle.await;
    if let Some(handle) = health_handle {
        let _ = handle.await;
    }
    socket_handle.abort();
    queue_handle.abort();
    info!("group-organizer shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
