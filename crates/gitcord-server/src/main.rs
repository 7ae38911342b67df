//! gitcord relay - binary entry point

use gitcord_core::RelayConfig;
use gitcord_server::{AppState, DiscordClient, PasteClient, ServerConfig, serve};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gitcord=info,gitcord_server=info,gitcord_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RelayConfig::from_env()?;
    if config.webhook_secret.is_none() {
        tracing::warn!("GITCORD_WEBHOOK_SECRET not set, deliveries will not be authenticated");
    }

    let paste = match (config.debug_paste, &config.paste_api_key) {
        (true, Some(key)) => Some(Arc::new(PasteClient::new(key.clone()))),
        (true, None) => {
            tracing::warn!("GITCORD_DEBUG_PASTE set without GITCORD_PASTE_API_KEY, ignoring");
            None
        }
        _ => None,
    };

    let state = AppState {
        config: Arc::new(config),
        discord: Arc::new(DiscordClient::new()),
        paste,
    };

    let server_config = ServerConfig::from_env();
    serve(server_config, state).await?;

    Ok(())
}
