use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors surfaced by configuration loading and embed building.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `GITCORD_IGNORED_BRANCHES_REGEX` did not compile.
    #[error("invalid ignored-branches pattern: {0}")]
    InvalidBranchPattern(#[from] regex::Error),

    /// A recognized event carried a payload we could not deserialize.
    #[error("malformed {event} payload: {source}")]
    MalformedPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}
