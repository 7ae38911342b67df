use thiserror::Error;

/// Result type alias for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors from the relay's outbound side.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Discord accepted the connection but rejected the webhook execution.
    #[error("discord returned {status} for webhook {hook_id}: {body}")]
    DiscordDelivery {
        hook_id: String,
        status: u16,
        body: String,
    },

    /// The outbound request never completed.
    #[error("outbound request failed: {0}")]
    Http(#[from] reqwest::Error),
}
