//! Outbound Discord webhook execution.

use crate::error::{ServerError, ServerResult};
use async_trait::async_trait;
use gitcord_proto::discord::WebhookBody;

const DISCORD_API_BASE: &str = "https://discord.com/api";

/// Abstraction over the Discord webhook endpoint so route handlers can be
/// exercised with a mock.
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Execute the webhook identified by `hook_id`/`hook_token` with `body`.
    async fn execute_webhook(
        &self,
        hook_id: &str,
        hook_token: &str,
        body: &WebhookBody,
    ) -> ServerResult<()>;
}

/// reqwest-backed [`DiscordApi`] implementation.
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
}

impl DiscordClient {
    pub fn new() -> Self {
        Self::with_base_url(DISCORD_API_BASE)
    }

    /// Point the client at a different API base. Tests aim this at a local
    /// stub server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for DiscordClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    async fn execute_webhook(
        &self,
        hook_id: &str,
        hook_token: &str,
        body: &WebhookBody,
    ) -> ServerResult<()> {
        let url = format!("{}/webhooks/{hook_id}/{hook_token}", self.base_url);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(hook_id, "discord webhook executed");
            return Ok(());
        }

        Err(ServerError::DiscordDelivery {
            hook_id: hook_id.to_string(),
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitcord_proto::discord::{Embed, EmbedAuthor};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> WebhookBody {
        WebhookBody::single(Embed {
            title: "[acme/widget] New star added".to_string(),
            url: None,
            description: None,
            author: EmbedAuthor {
                name: "octocat".to_string(),
                url: "https://github.com/octocat".to_string(),
                icon_url: "https://avatars.githubusercontent.com/u/1".to_string(),
            },
            color: 16_562_432,
            footer: None,
            fields: Vec::new(),
        })
    }

    #[tokio::test]
    async fn posts_embed_json_to_webhook_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks/123/token-abc"))
            .and(body_partial_json(serde_json::json!({
                "embeds": [{"title": "[acme/widget] New star added"}]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = DiscordClient::with_base_url(server.uri());
        client
            .execute_webhook("123", "token-abc", &sample_body())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn discord_error_is_surfaced_with_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
            .mount(&server)
            .await;

        let client = DiscordClient::with_base_url(server.uri());
        let err = client
            .execute_webhook("123", "bad-token", &sample_body())
            .await
            .unwrap_err();

        match err {
            ServerError::DiscordDelivery { hook_id, status, body } => {
                assert_eq!(hook_id, "123");
                assert_eq!(status, 404);
                assert_eq!(body, "Unknown Webhook");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
