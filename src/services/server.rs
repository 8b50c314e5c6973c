//! HTTP server exposing the sync API.
//!
//! Runs `axum::serve` on a spawned task and stops it through a
//! cancellation token.

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::services::sync_api::sync_api_routes;
use crate::services::sync_manager::SyncManager;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Handle to control the running server.
pub struct ServerHandle {
    cancel_token: CancellationToken,
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) {
        log::info!("[server] Stopping server on {}", self.addr);
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            log::error!("[server] Server task failed: {}", e);
        }
    }
}

/// Full application router with CORS.
pub fn router(manager: SyncManager) -> Router {
    sync_api_routes()
        .with_state(manager)
        .fallback(|| async { StatusCode::NOT_FOUND.into_response() })
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}

/// Bind the listener and start serving in the background.
///
/// Port 0 binds an ephemeral port; see [`ServerHandle::local_addr`].
pub async fn start_server(
    config: &ServerConfig,
    manager: SyncManager,
) -> Result<ServerHandle, AppError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind to {}: {}", addr, e)))?;
    let addr = listener.local_addr()?;

    log::info!("[server] Listening on http://{}", addr);

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();
    let app = router(manager);

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        });

        if let Err(e) = server.await {
            log::error!("[server] Server error: {}", e);
        }

        log::info!("[server] Server stopped");
    });

    Ok(ServerHandle {
        cancel_token,
        addr,
        task,
    })
}
