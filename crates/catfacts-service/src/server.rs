//! HTTP server setup with graceful shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use catfacts_storage::FactStore;

use crate::error::ServiceError;
use crate::handler::{facts_router, AppState};

/// Run the HTTP server with graceful shutdown support.
///
/// Accepts a shutdown signal future that, when resolved, stops accepting
/// connections and lets in-flight requests finish.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    store: Arc<FactStore>,
    shutdown_signal: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    serve_with_shutdown(listener, store, shutdown_signal).await
}

/// Serve on an already bound listener.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    store: Arc<FactStore>,
    shutdown_signal: F,
) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("HTTP server ready on {}", local_addr);

    let app = facts_router(AppState::new(store));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}
