//! Coindeck - crypto market dashboard backend.
//!
//! Main entry point for the coindeck CLI and server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use coindeck_api::{ApiConfig, ApiServer, ApiState};
use coindeck_automation::{AutomationConfig, Controller, ProcessExecutor};
use coindeck_store::SqliteStats;

/// Coindeck CLI.
#[derive(Parser)]
#[command(name = "coindeck")]
#[command(about = "Crypto market dashboard backend")]
#[command(version)]
struct Cli {
    /// Automation configuration file (TOML); built-in defaults when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, default_value = "coindeck.db", global = true)]
    db: PathBuf,

    /// Log directory for rotated file output
    #[arg(long, default_value = "logs", global = true)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in foreground (default)
    Run {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Start all automation jobs on boot
        #[arg(long)]
        autostart: bool,
    },

    /// Run one automation job to completion and exit
    Once {
        /// Job id (e.g. price_collection)
        job: String,
    },

    /// Print the automation status snapshot as JSON
    Status,
}

/// Initialize tracing with console and file output.
///
/// Log files are written to the log directory with daily rotation.
fn init_tracing(log_dir: &PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("coindeck")
        .filename_suffix("log")
        .max_log_files(30)
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer guard alive for the program duration
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AutomationConfig> {
    match path {
        Some(path) => AutomationConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => Ok(AutomationConfig::default()),
    }
}

async fn build_controller(
    config: AutomationConfig,
    db: &PathBuf,
) -> anyhow::Result<Arc<Controller>> {
    let store = SqliteStats::open(db)
        .await
        .with_context(|| format!("failed to open database {}", db.display()))?;

    Ok(Arc::new(Controller::new(
        config,
        Arc::new(ProcessExecutor::new()),
        Arc::new(store),
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_dir)?;

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        None => run_server(config, &cli.db, "127.0.0.1".to_string(), 8080, false).await,
        Some(Commands::Run {
            host,
            port,
            autostart,
        }) => run_server(config, &cli.db, host, port, autostart).await,
        Some(Commands::Once { job }) => run_once(config, &cli.db, &job).await,
        Some(Commands::Status) => print_status(config, &cli.db).await,
    }
}

/// Run the server in foreground until SIGINT or SIGTERM.
async fn run_server(
    config: AutomationConfig,
    db: &PathBuf,
    host: String,
    port: u16,
    autostart: bool,
) -> anyhow::Result<()> {
    info!("Starting coindeck v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", db.display());

    let autostart = autostart || config.autostart;
    let controller = build_controller(config, db).await?;

    if autostart {
        controller.start_all().await;
    }

    let state = Arc::new(ApiState::new(controller.clone()));
    let server = ApiServer::new(ApiConfig::new(host.as_str(), port), state);

    info!("Coindeck ready at http://{}:{}", host, port);
    info!("  GET  /api/automation/status");
    info!("  POST /api/automation/tasks/{{id}}/start");
    info!("  POST /api/automation/tasks/{{id}}/stop");
    info!("  POST /api/automation/tasks/{{id}}/run");

    // Workers are stopped before the listener drains so no new job
    // activity begins once shutdown is underway.
    let shutdown = {
        let controller = controller.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            controller.stop_all().await;
        }
    };

    server
        .run(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    info!("Shutting down");
    Ok(())
}

/// Resolve on SIGINT (Ctrl-C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Execute one job synchronously; exit code reflects the outcome.
async fn run_once(config: AutomationConfig, db: &PathBuf, job: &str) -> anyhow::Result<()> {
    let controller = build_controller(config, db).await?;

    let success = controller.run_once(job).await?;
    if success {
        info!("Job '{}' completed successfully", job);
        Ok(())
    } else {
        anyhow::bail!("job '{}' failed; see logs for details", job)
    }
}

/// Print the status snapshot for a fresh controller.
///
/// Runs in its own process, so per-job counters reflect this process
/// only; record counts come from the shared database.
async fn print_status(config: AutomationConfig, db: &PathBuf) -> anyhow::Result<()> {
    let controller = build_controller(config, db).await?;
    let status = controller.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
