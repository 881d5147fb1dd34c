use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use menu_reviews::app_state::AppState;
use menu_reviews::build_app;
use menu_reviews::config::Config;
use menu_reviews::db::pool::get_db_pool;
use menu_reviews::db::{MemoryReviewStore, PgReviewStore, ReviewStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let _guard = init_tracing(&config)?;

    let (store, pool) = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = get_db_pool(&config, database_url).await?;
            let store: Arc<dyn ReviewStore> = Arc::new(PgReviewStore::new(pool.clone()));
            (store, Some(pool))
        }
        None => {
            warn!("DATABASE_URL not set, reviews are kept in memory and lost on shutdown");
            let store: Arc<dyn ReviewStore> = Arc::new(MemoryReviewStore::new());
            (store, None)
        }
    };
    info!(store = store.backend_tag(), "Review store ready");

    let addr = config.bind_addr;
    let app = build_app(AppState::new(store, config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind listener on {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server encountered an error")?;

    if let Some(pool) = pool {
        info!("Closing database pool...");
        pool.close().await;
    }
    info!("Shutdown complete.");
    Ok(())
}

/// Logs to stdout, and also to a daily file when `LOG_DIR` is set.
fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "menu_reviews.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true) // Include target (module path) in logs
                .with_writer(std::io::stdout.and(non_blocking))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .init();
            Ok(None)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}
