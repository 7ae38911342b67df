//! Discord webhook execution bodies.
//!
//! See <https://discord.com/developers/docs/resources/webhook#execute-webhook>.
//! Absent optional slots are omitted from the JSON entirely rather than sent
//! as `null`, which is what the webhook endpoint expects.

use serde::{Deserialize, Serialize};

/// Body POSTed to a Discord webhook: either a rich embed or, for the
/// debug-paste relay, a plain content message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WebhookBody {
    /// Rich-embed message.
    Embeds { embeds: Vec<Embed> },
    /// Plain text message.
    Content { content: String },
}

impl WebhookBody {
    /// Wrap a single embed the way the relay always sends them.
    pub fn single(embed: Embed) -> Self {
        WebhookBody::Embeds {
            embeds: vec![embed],
        }
    }
}

/// A Discord embed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub author: EmbedAuthor,
    /// Decimal RGB color.
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

/// Author block, always the delivery's sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
    pub icon_url: String,
}

/// Footer text slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

/// A titled field, used by check-run embeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_slots_are_omitted() {
        let body = WebhookBody::single(Embed {
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
        });

        let json = serde_json::to_value(&body).unwrap();
        let embed = &json["embeds"][0];
        assert!(embed.get("url").is_none());
        assert!(embed.get("description").is_none());
        assert!(embed.get("footer").is_none());
        assert_eq!(embed["fields"], serde_json::json!([]));
    }

    #[test]
    fn content_body_serializes_flat() {
        let body = WebhookBody::Content {
            content: "paste response".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"content": "paste response"})
        );
    }
}
