//! # gitcord-proto
//!
//! Wire types for the gitcord relay, shared by the embed builders and the
//! HTTP server:
//!
//! - [`github`] — the fragments of GitHub webhook payloads the relay reads
//! - [`discord`] — Discord's webhook execution body and embed schema

pub mod discord;
pub mod github;

pub use discord::{Embed, EmbedAuthor, EmbedField, EmbedFooter, WebhookBody};
