use anyhow::Context;
use clap::Parser;
use ottometer_server::api::create_router;
use ottometer_server::api::handlers::AppState;
use ottometer_server::config;
use ottometer_storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ottometer-server", about = "HTTP API for grow units", version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "OTTOMETER_PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Address to bind to
    #[arg(long, env = "OTTOMETER_BIND", default_value = config::DEFAULT_BIND)]
    bind: String,

    /// Path of the database
    #[arg(short, long, env = "OTTOMETER_DB_PATH", default_value = config::DEFAULT_DB_PATH)]
    db_path: PathBuf,

    /// Seconds to drain in-flight requests on shutdown
    #[arg(long, default_value_t = config::DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    shutdown_timeout: u64,

    /// Milliseconds a single storage operation may take
    #[arg(long, default_value_t = config::DEFAULT_OP_TIMEOUT_MS)]
    op_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    let storage = Arc::new(
        Storage::open(&args.db_path)
            .with_context(|| format!("Failed to open database: {:?}", args.db_path))?,
    );
    tracing::info!(path = %args.db_path.display(), "opened database");

    let state = AppState::new(storage.clone(), Duration::from_millis(args.op_timeout_ms));
    let app = create_router(state);

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %addr,
        shutdown_timeout_secs = args.shutdown_timeout,
        op_timeout_ms = args.op_timeout_ms,
        "ottometer ready"
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    });
    let mut server = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => {
            // The server stopped without a signal, so something went wrong
            result.context("Server task panicked")??;
        }
        _ = wait_for_signal() => {
            let _ = shutdown_tx.send(true);
            let drain = Duration::from_secs(args.shutdown_timeout);
            match tokio::time::timeout(drain, &mut server).await {
                Ok(result) => {
                    result.context("Server task panicked")??;
                    tracing::info!("all requests drained");
                }
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = args.shutdown_timeout,
                        "drain timeout exceeded, dropping remaining connections"
                    );
                    server.abort();
                }
            }
        }
    }

    storage.flush().context("Failed to flush database")?;
    tracing::info!("closed database");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
