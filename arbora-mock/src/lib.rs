//! Arbora Mock - in-memory inventory backend
//!
//! Serves the REST paths consumed by `arbora-client` from memory, with
//! one-shot failure injection per route. Used by integration tests and as a
//! local development server.

pub mod api;
pub mod state;

use std::net::SocketAddr;

pub use api::router;
pub use state::{MockData, MockRoute, MockState};

/// Default listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:3900";

/// Listen address from `ARBORA_MOCK_ADDR`
pub fn listen_addr_from_env() -> String {
    std::env::var("ARBORA_MOCK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string())
}

/// Bind `addr` and serve in a background task, returning the bound address
pub async fn spawn(state: MockState, addr: &str) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let app = router(state).layer(tower_http::trace::TraceLayer::new_for_http());

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Mock server stopped: {}", e);
        }
    });

    tracing::info!(%local, "Mock backend listening");
    Ok((local, handle))
}

/// Serve on an ephemeral local port
pub async fn spawn_ephemeral(state: MockState) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    spawn(state, "127.0.0.1:0").await
}
