//! Relay configuration.
//!
//! All knobs come from `GITCORD_*` environment variables, resolved once at
//! startup. Lists are comma-separated; flags accept `1` or `true`.

use crate::error::{CoreError, CoreResult};
use regex::Regex;

/// Runtime configuration for the relay.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    ignored_branches: Vec<String>,
    ignored_branch_pattern: Option<Regex>,
    ignored_users: Vec<String>,
    ignored_events: Vec<String>,
    /// Redact `<details>` bodies instead of spoilering them.
    pub hide_details: bool,
    /// Relay a paste of the embed JSON instead of the embed itself.
    pub debug_paste: bool,
    /// API key for the paste service; required when `debug_paste` is set.
    pub paste_api_key: Option<String>,
    /// Shared secret for `X-Hub-Signature-256` validation. Validation is
    /// skipped when unset.
    pub webhook_secret: Option<String>,
}

impl RelayConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Keeps tests hermetic: no process-global environment mutation needed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let ignored_branch_pattern = lookup("GITCORD_IGNORED_BRANCHES_REGEX")
            .map(|pattern| Regex::new(&pattern))
            .transpose()?;

        Ok(Self {
            ignored_branches: split_list(lookup("GITCORD_IGNORED_BRANCHES")),
            ignored_branch_pattern,
            ignored_users: split_list(lookup("GITCORD_IGNORED_USERS")),
            ignored_events: split_list(lookup("GITCORD_IGNORED_EVENTS")),
            hide_details: is_truthy(lookup("GITCORD_HIDE_DETAILS")),
            debug_paste: is_truthy(lookup("GITCORD_DEBUG_PASTE")),
            paste_api_key: lookup("GITCORD_PASTE_API_KEY"),
            webhook_secret: lookup("GITCORD_WEBHOOK_SECRET"),
        })
    }

    /// Whether pushes/refs on `branch` should be dropped.
    pub fn is_ignored_branch(&self, branch: &str) -> bool {
        if let Some(pattern) = &self.ignored_branch_pattern
            && pattern.is_match(branch)
        {
            return true;
        }
        self.ignored_branches.iter().any(|b| b == branch)
    }

    /// Whether activity from `user` should be dropped.
    pub fn is_ignored_user(&self, user: &str) -> bool {
        self.ignored_users.iter().any(|u| u == user)
    }

    /// Whether the whole `event` type should be dropped.
    pub fn is_ignored_event(&self, event: &str) -> bool {
        self.ignored_events.iter().any(|e| e == event)
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Only explicit `1`/`true` enable a flag, to avoid accidental activation.
fn is_truthy(value: Option<String>) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
