use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use confdesk_api::background::session_cleanup;
use confdesk_api::config::ServerConfig;
use confdesk_api::router::build_app_router;
use confdesk_api::state::AppState;
use confdesk_cache::Cache;
use confdesk_db::{DbMonitor, DbPool};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type BoxError = Box<dyn Error + Send + Sync>;

/// How long background jobs get to notice cancellation after shutdown.
const BACKGROUND_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run(ServerConfig::from_env()).await {
        tracing::error!(error = %e, "ConfDesk server exited with an error");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("confdesk_api=debug,confdesk_db=info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify and migrate the database before anything serves traffic.
async fn prepare_database(config: &ServerConfig) -> Result<DbPool, BoxError> {
    let pool = confdesk_db::create_pool(&config.database_url, config.db_max_connections).await?;
    confdesk_db::health_check(&pool).await?;
    confdesk_db::run_migrations(&pool).await?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "Database ready and migrated"
    );
    Ok(pool)
}

async fn run(config: ServerConfig) -> Result<(), BoxError> {
    tracing::info!(
        host = %config.host,
        port = config.port,
        reference_prefix = %config.reference_prefix,
        "Loaded server configuration"
    );
    let addr = SocketAddr::new(config.host.parse()?, config.port);

    let pool = prepare_database(&config).await?;
    let cache = Cache::connect(config.redis_url.as_deref()).await;
    tracing::info!(backend = cache.backend_name(), "Cache ready");

    let cancel = CancellationToken::new();
    let cleanup = tokio::spawn(session_cleanup::run(
        pool.clone(),
        Duration::from_secs(config.session_cleanup_interval_secs),
        cancel.clone(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache,
        monitor: Arc::new(DbMonitor::new()),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "ConfDesk listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if tokio::time::timeout(BACKGROUND_DRAIN, cleanup).await.is_err() {
        tracing::warn!("Session cleanup did not stop in time");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, Ctrl-C only");
                wait_for_ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            () = wait_for_ctrl_c() => {}
            _ = term.recv() => tracing::info!("Received SIGTERM, draining connections"),
        }
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, draining connections"),
        // Without a handler, only SIGTERM or a kill stops the server.
        Err(e) => {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}
