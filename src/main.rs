// mmapbench-live - version 0.1.0
// Live dashboard server for mmapbench output with tracing logging
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, level_filters::LevelFilter};

use mmapbench_live::cli::{Args, Commands, LogLevel};
use mmapbench_live::commands::{command_check, command_generate_feed};
use mmapbench_live::config::{render_config, resolve_config, validate_effective_config, Config};
use mmapbench_live::handlers::build_router;
use mmapbench_live::ingest::{open_feed, run_ingest};
use mmapbench_live::sampler::{run_cache_sampler, run_cpu_sampler};
use mmapbench_live::state::AppState;

/// Initializes tracing logging subsystem with configured log level
fn setup_logging(config: &Config) {
    let level = config.log_level().unwrap_or(LogLevel::Info);
    let max_level = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    // stdout may be part of a pipeline; logs go to stderr.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Resolves once SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Starts the background tasks and serves HTTP until a shutdown signal.
async fn serve(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind(), config.port())
        .parse()
        .context("Invalid listen address")?;

    let feed = open_feed(config.input_file.as_deref()).await?;
    let state = AppState::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to register telemetry: {e}"))?;

    // Background tasks own their errors; none of them can stop the server.
    let ingest_task = tokio::spawn(run_ingest(feed, state.clone()));
    let cache_task = tokio::spawn(run_cache_sampler(state.clone()));
    let cpu_task = tokio::spawn(run_cpu_sampler(state.clone()));
    debug!("Ingest and sampler tasks started");

    let app = build_router(state.clone());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("serving on http://{}", addr);

    // Open event streams are not drained on shutdown; they are dropped.
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return Err(e.into());
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, exiting...");
        }
    }

    ingest_task.abort();
    cache_task.abort();
    cpu_task.abort();

    info!("mmapbench-live stopped");
    Ok(())
}

/// -------------------------------------------------------------------
/// MAIN APPLICATION ENTRY POINT
/// -------------------------------------------------------------------
fn main() -> Result<()> {
    let args = Args::parse();

    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {e:#}");
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        println!("{}", render_config(&config, &args.config_format)?);
        return Ok(());
    }

    if let Some(command) = &args.command {
        let config = resolve_config(&args)?;
        setup_logging(&config);

        return match command {
            Commands::Check => command_check(&config),
            Commands::GenerateFeed {
                output,
                rows,
                devices,
                delay_ms,
            } => command_generate_feed(output.clone(), *rows, devices, *delay_ms),
        };
    }

    let config = resolve_config(&args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {e:#}");
        std::process::exit(1);
    }

    setup_logging(&config);
    info!("Starting mmapbench-live");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    let result = runtime.block_on(serve(config));

    // A pending stdin read sits on a blocking thread and would keep the
    // runtime alive until the writer closes the pipe.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}
