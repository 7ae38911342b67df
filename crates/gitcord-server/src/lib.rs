//! # gitcord-server
//!
//! The HTTP side of the gitcord relay. A delivery arrives on
//! `POST /{hook_id}/{hook_token}` with the standard GitHub webhook headers,
//! gets translated by [`gitcord_core`] into an embed, and is forwarded to the
//! matching Discord webhook. One request in, at most one request out.
//!
//! ## Key components
//!
//! - [`routes`] — the relay route and health endpoint
//! - [`signature`] — `X-Hub-Signature-256` HMAC validation
//! - [`DiscordApi`] / [`DiscordClient`] — outbound webhook execution
//! - [`PasteClient`] — optional debug-paste relay

pub mod routes;
pub mod signature;

mod discord;
mod error;
mod paste;

pub use discord::{DiscordApi, DiscordClient};
pub use error::{ServerError, ServerResult};
pub use paste::PasteClient;

use axum::Router;
use gitcord_core::RelayConfig;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Relay configuration (ignore lists, flags, secret).
    pub config: Arc<RelayConfig>,
    /// Outbound Discord client.
    pub discord: Arc<dyn DiscordApi>,
    /// Paste client, present when the debug relay is configured.
    pub paste: Option<Arc<PasteClient>>,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl ServerConfig {
    /// Read the port from `GITCORD_PORT`, falling back to the default.
    pub fn from_env() -> Self {
        let port = std::env::var("GITCORD_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(|| Self::default().port);
        Self { port }
    }
}

/// Create the application router.
pub fn create_app(state: AppState) -> Router {
    routes::relay_routes(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), std::io::Error> {
    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Starting gitcord relay on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
