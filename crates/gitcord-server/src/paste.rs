//! Debug paste relay.
//!
//! When `GITCORD_DEBUG_PASTE` is enabled the relay uploads the embed JSON to
//! paste.gg and sends the paste service's response to Discord as a plain
//! content message. Purely a debugging aid for inspecting what a delivery
//! would have produced.

use crate::error::ServerResult;
use serde_json::json;

const PASTE_API_BASE: &str = "https://api.paste.gg/v1";

/// Client for the paste.gg REST API.
pub struct PasteClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PasteClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, PASTE_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Upload `content` as an anonymous text paste and return the service's
    /// raw response body, successful or not — the point is to see it.
    pub async fn upload(&self, content: &str) -> ServerResult<String> {
        let body = json!({
            "files": [{
                "content": {
                    "format": "text",
                    "value": content
                }
            }]
        });

        let response = self
            .http
            .post(format!("{}/pastes", self.base_url))
            .header(reqwest::header::USER_AGENT, "gitcord")
            .header(reqwest::header::AUTHORIZATION, format!("Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        Ok(response.text().await?)
    }
}
