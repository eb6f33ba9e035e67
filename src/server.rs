use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::app::{app, AppState};
use crate::auth::GoogleOAuth;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::search::VespaClient;
use crate::services::SessionService;

/// Connect, migrate and serve until SIGINT/SIGTERM, or until stdin closes
/// when `exit_on_stdin_close` is set.
pub async fn serve(config: AppConfig, exit_on_stdin_close: bool) -> anyhow::Result<()> {
    tracing::info!("Starting search-console in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;

    let search = VespaClient::new(Duration::from_secs(config.search.timeout_secs))
        .context("failed to build search client")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid HOST/PORT")?;
    let web_enabled = config.web.enabled;
    let prune_interval = Duration::from_secs(config.session.prune_interval_secs.max(1));

    let google = GoogleOAuth::from_config(&config.google, Duration::from_secs(config.search.timeout_secs))
        .context("invalid Google sign-in settings")?;

    let mut state = AppState::new(pool.clone(), Arc::new(search), config);
    match google {
        Some(google) => {
            tracing::info!("Google sign-in enabled");
            state = state.with_google(google);
        }
        None => tracing::debug!("Google sign-in not configured"),
    }
    let sessions = state.sessions();
    let router = app(state);

    // Cancellation channel for the session reaper
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let reaper = tokio::spawn(reap_sessions(sessions, prune_interval, shutdown_rx));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", addr);
    if web_enabled {
        tracing::info!("Web console available at http://{}/", addr);
    }

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(exit_on_stdin_close))
        .await
        .context("server error")?;

    let _ = shutdown_tx.send(true);
    let _ = reaper.await;
    close(pool).await;

    Ok(())
}

async fn reap_sessions(
    sessions: SessionService,
    every: Duration,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match sessions.prune_expired().await {
                    Ok(0) => {}
                    Ok(pruned) => tracing::info!("Pruned {} expired session(s)", pruned),
                    Err(e) => tracing::warn!("Session pruning failed: {}", e),
                }
            }
            _ = shutdown_rx.changed() => {
                tracing::debug!("Session reaper stopping");
                break;
            }
        }
    }
}

async fn close(pool: PgPool) {
    if tokio::time::timeout(Duration::from_secs(10), pool.close()).await.is_err() {
        tracing::warn!("Timed out closing database pool");
    }
}

/// Wait for SIGINT, SIGTERM or (optionally) end of stdin.
async fn shutdown_signal(exit_on_stdin_close: bool) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stdin_closed = async {
        if exit_on_stdin_close {
            wait_for_eof(tokio::io::stdin()).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
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
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
        _ = stdin_closed => tracing::info!("Standard input closed, shutting down"),
    }
}

/// Resolves once `reader` hits end of input or a read error
async fn wait_for_eof<R: AsyncRead + Unpin>(mut reader: R) {
    let mut buf = [0u8; 256];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    }
}
