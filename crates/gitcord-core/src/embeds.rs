//! GitHub event to Discord embed mapping.
//!
//! [`build_embed`] is the dispatch table: given the `X-GitHub-Event` header
//! value and the delivery payload, it returns the webhook body to send, or
//! `None` when the delivery should be acknowledged without relaying anything
//! (unhandled event, filtered branch/user, draft release, ...).
//!
//! Every text slot is routed through [`truncate_field`] with the limits
//! Discord enforces a comfortable margin below: titles, footers and author
//! names at 255, descriptions and check output at 1000, single commit lines
//! at 50, and the aggregate push commit list at 1500.

use crate::config::RelayConfig;
use crate::error::{CoreError, CoreResult};
use crate::fields::truncate_field;
use gitcord_proto::discord::{Embed, EmbedAuthor, EmbedField, EmbedFooter, WebhookBody};
use gitcord_proto::github::{
    CheckRunPayload, CommitCommentPayload, DeploymentPayload, DeploymentStatusPayload,
    DiscussionCommentPayload, DiscussionPayload, ForkPayload, IssueCommentPayload, IssuesPayload,
    PackagePayload, PingPayload, PullRequestPayload, PullRequestReviewCommentPayload,
    PullRequestReviewPayload, PushPayload, RefChangePayload, ReleasePayload, StarPayload, User,
    WikiPayload,
};
use serde_json::Value;

const TITLE_LIMIT: usize = 255;
const AUTHOR_LIMIT: usize = 255;
const FOOTER_LIMIT: usize = 255;
const DESCRIPTION_LIMIT: usize = 1000;
const CHECK_FIELD_LIMIT: usize = 1000;
const COMMIT_TITLE_LIMIT: usize = 50;
const PUSH_LIST_LIMIT: usize = 1500;

/// Embed colors, decimal RGB as Discord wants them.
mod colors {
    pub const PING: u32 = 12_118_406;
    pub const RELEASE: u32 = 14_573_028;
    pub const PUSH: u32 = 6_120_164;
    pub const FORCE_PUSH: u32 = 16_722_234;
    pub const PULL_OPEN: u32 = 37_378;
    pub const PULL_DRAFT: u32 = 10_987_431;
    pub const PULL_MERGED: u32 = 8_866_047;
    pub const PULL_CLOSED: u32 = 16_722_234;
    pub const PULL_ENQUEUED: u32 = 16_752_896;
    pub const PULL_DEQUEUED: u32 = 13_584_462;
    pub const REVIEW_NEUTRAL: u32 = 7_829_367;
    pub const REVIEW_APPROVED: u32 = 37_378;
    pub const REVIEW_CHANGES: u32 = 16_722_234;
    pub const ISSUE_OPEN: u32 = 16_743_680;
    pub const ISSUE_CLOSED: u32 = 16_730_159;
    pub const ISSUE_COMMENT: u32 = 11_373_312;
    pub const DISCUSSION: u32 = 9_737_471;
    pub const DISCUSSION_COMMENT: u32 = 35_446;
    pub const FORK: u32 = 16_562_432;
    pub const STAR: u32 = 16_562_432;
    pub const BRANCH_CREATE: u32 = 3_881_787;
    pub const BRANCH_DELETE: u32 = 1;
    pub const COMMIT_COMMENT: u32 = 3_881_787;
    pub const CHECK_SUCCESS: u32 = 45_866;
    pub const CHECK_FAILURE: u32 = 16_726_843;
    pub const CHECK_WARNING: u32 = 14_984_995;
    pub const CHECK_NEUTRAL: u32 = 11_184_810;
    pub const PACKAGE: u32 = 37_378;
    pub const DEPLOY_START: u32 = 11_158_713;
    pub const DEPLOY_SUCCESS: u32 = 45_866;
    pub const DEPLOY_FAILURE: u32 = 16_726_843;
    pub const WIKI_CREATED: u32 = 45_866;
    pub const WIKI_EDITED: u32 = 16_562_432;
    pub const WIKI_MIXED: u32 = 6_120_164;
}

/// Everything a builder decides about an embed before the common slots
/// (author, truncation) are filled in.
#[derive(Debug, Default)]
struct EmbedSpec {
    title: String,
    url: Option<String>,
    description: Option<String>,
    footer: Option<String>,
    fields: Vec<EmbedField>,
    color: u32,
}

impl EmbedSpec {
    fn into_body(self, sender: &User, config: &RelayConfig) -> WebhookBody {
        let hide = config.hide_details;
        WebhookBody::single(Embed {
            title: truncate_field(&self.title, TITLE_LIMIT, hide),
            url: self.url,
            description: self
                .description
                .map(|text| truncate_field(&text, DESCRIPTION_LIMIT, hide)),
            author: EmbedAuthor {
                name: truncate_field(&sender.login, AUTHOR_LIMIT, hide),
                url: sender.html_url.clone(),
                icon_url: format!("{}?={}", sender.avatar_url, avatar_cache_key()),
            },
            color: self.color,
            footer: self
                .footer
                .map(|text| EmbedFooter {
                    text: truncate_field(&text, FOOTER_LIMIT, hide),
                }),
            fields: self.fields,
        })
    }
}

/// Daily-rotating query suffix so Discord refreshes cached avatars.
fn avatar_cache_key() -> String {
    chrono::Utc::now().format("%Y%m%d").to_string()
}

/// First seven characters of a commit sha.
fn short_commit(sha: &str) -> &str {
    &sha[..sha.len().min(7)]
}

/// Translate a delivery into the webhook body to relay.
///
/// `Ok(None)` means the delivery is acknowledged but produces no message.
///
/// # Errors
///
/// [`CoreError::MalformedPayload`] when a recognized event's payload does not
/// deserialize into the expected shape.
pub fn build_embed(
    event: &str,
    payload: &Value,
    config: &RelayConfig,
) -> CoreResult<Option<WebhookBody>> {
    if config.is_ignored_event(event) {
        return Ok(None);
    }
    let action = payload.get("action").and_then(Value::as_str);

    let body = match event {
        "check_run" => match action {
            Some("completed") => build_check(&parse(event, payload)?, config),
            _ => None,
        },
        "commit_comment" => match action {
            Some("created") => build_commit_comment(&parse(event, payload)?, config),
            _ => None,
        },
        "create" => build_ref_created(&parse(event, payload)?, config),
        "delete" => build_ref_deleted(&parse(event, payload)?, config),
        "discussion" => match action {
            Some("created") => build_discussion(&parse(event, payload)?, config),
            _ => None,
        },
        "discussion_comment" => match action {
            Some("created") => build_discussion_comment(&parse(event, payload)?, config),
            _ => None,
        },
        "fork" => build_fork(&parse(event, payload)?, config),
        "issue_comment" => match action {
            Some("created") => build_issue_comment(&parse(event, payload)?, config),
            _ => None,
        },
        "issues" => match action {
            Some("opened") => build_issue_opened(&parse(event, payload)?, config),
            Some("reopened") => build_issue_reopened(&parse(event, payload)?, config),
            Some("closed") => build_issue_closed(&parse(event, payload)?, config),
            _ => None,
        },
        "package" | "registry_package" => match action {
            Some("published") => build_package(&parse(event, payload)?, "Published", config),
            Some("updated") => build_package(&parse(event, payload)?, "Updated", config),
            _ => None,
        },
        "ping" => build_ping(&parse(event, payload)?, config),
        "pull_request" => match action {
            Some("opened") => build_pull_opened(&parse(event, payload)?, config),
            Some("closed") => build_pull_closed(&parse(event, payload)?, config),
            Some("reopened") => build_pull_reopened(&parse(event, payload)?, config),
            Some("converted_to_draft") => build_pull_drafted(&parse(event, payload)?, config),
            Some("ready_for_review") => build_pull_ready(&parse(event, payload)?, config),
            Some("enqueued") => build_pull_enqueued(&parse(event, payload)?, config),
            Some("dequeued") => build_pull_dequeued(&parse(event, payload)?, config),
            _ => None,
        },
        "pull_request_review" => match action {
            Some(act @ ("submitted" | "dismissed")) => {
                build_pull_review(&parse(event, payload)?, act, config)
            }
            _ => None,
        },
        "pull_request_review_comment" => match action {
            Some("created") => build_pull_review_comment(&parse(event, payload)?, config),
            _ => None,
        },
        "push" => build_push(&parse(event, payload)?, config),
        "release" => match action {
            Some("released" | "prereleased") => build_release(&parse(event, payload)?, config),
            _ => None,
        },
        "star" => match action {
            Some("created") => build_star(&parse(event, payload)?, config),
            _ => None,
        },
        "deployment" => match action {
            Some("created") => build_deployment(&parse(event, payload)?, config),
            _ => None,
        },
        "deployment_status" => build_deployment_status(&parse(event, payload)?, config),
        "gollum" => build_wiki(&parse(event, payload)?, config),
        _ => None,
    };

    Ok(body)
}

fn parse<T: serde::de::DeserializeOwned>(event: &str, payload: &Value) -> CoreResult<T> {
    serde_json::from_value(payload.clone()).map_err(|source| CoreError::MalformedPayload {
        event: event.to_string(),
        source,
    })
}

fn build_ping(payload: &PingPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let is_org = payload.hook.hook_type == "Organization";
    let name = if is_org {
        payload.organization.as_ref().map(|org| org.login.clone())
    } else {
        payload
            .repository
            .as_ref()
            .map(|repo| repo.full_name.clone())
    }?;

    let spec = EmbedSpec {
        title: format!("[{name}] {} hook ping received", payload.hook.hook_type),
        description: payload.zen.clone(),
        color: colors::PING,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_release(payload: &ReleasePayload, config: &RelayConfig) -> Option<WebhookBody> {
    let release = &payload.release;
    if release.draft {
        return None;
    }

    let name = release.name.as_deref().unwrap_or(&release.tag_name);
    let kind = if release.prerelease { "prerelease" } else { "release" };
    let spec = EmbedSpec {
        title: format!(
            "[{}] New {kind} published: {name}",
            payload.repository.full_name
        ),
        url: Some(release.html_url.clone()),
        description: release.body.clone(),
        color: colors::RELEASE,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_push(payload: &PushPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let branch = payload
        .git_ref
        .strip_prefix("refs/heads/")
        .unwrap_or(&payload.git_ref);

    if config.is_ignored_branch(branch) || config.is_ignored_user(&payload.sender.login) {
        return None;
    }

    if payload.forced {
        let spec = EmbedSpec {
            title: format!(
                "[{}] Branch {branch} was force-pushed to `{}`",
                payload.repository.full_name,
                short_commit(&payload.after)
            ),
            url: Some(payload.compare.replace("...", "..")),
            color: colors::FORCE_PUSH,
            ..EmbedSpec::default()
        };
        return Some(spec.into_body(&payload.sender, config));
    }

    let amount = payload.commits.len();
    if amount == 0 {
        return None;
    }

    let mut description = String::new();
    let mut last_commit_url = "";
    for commit in &payload.commits {
        let headline = commit.message.lines().next().unwrap_or_default();
        let author = commit
            .author
            .username
            .as_deref()
            .or(commit.author.name.as_deref())
            .unwrap_or("unknown");
        let line = format!(
            "[`{}`]({}) {} - {}\n",
            short_commit(&commit.id),
            commit.url,
            truncate_field(headline, COMMIT_TITLE_LIMIT, config.hide_details),
            author
        );
        if description.chars().count() + line.chars().count() >= PUSH_LIST_LIMIT {
            break;
        }
        last_commit_url = &commit.url;
        description.push_str(&line);
    }

    let commit_word = if amount == 1 { "commit" } else { "commits" };
    let spec = EmbedSpec {
        title: format!(
            "[{}:{branch}] {amount} new {commit_word}",
            payload.repository.name
        ),
        url: Some(if amount == 1 {
            last_commit_url.to_string()
        } else {
            payload.compare.clone()
        }),
        description: Some(description),
        color: colors::PUSH,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_opened(payload: &PullRequestPayload, config: &RelayConfig) -> Option<WebhookBody> {
    if config.is_ignored_user(&payload.sender.login) {
        return None;
    }
    let pull = &payload.pull_request;
    let (kind, color) = pull_kind(pull.draft);
    let spec = EmbedSpec {
        title: format!(
            "[{}] {kind} opened: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(pull.html_url.clone()),
        description: pull.body.clone(),
        color,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_closed(payload: &PullRequestPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let pull = &payload.pull_request;
    let (status, color) = if pull.merged {
        ("merged", colors::PULL_MERGED)
    } else {
        ("closed", colors::PULL_CLOSED)
    };
    let spec = EmbedSpec {
        title: format!(
            "[{}] Pull request {status}: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(pull.html_url.clone()),
        color,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_reopened(payload: &PullRequestPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let pull = &payload.pull_request;
    let (kind, color) = pull_kind(pull.draft);
    let spec = EmbedSpec {
        title: format!(
            "[{}] {kind} reopened: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(pull.html_url.clone()),
        color,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_drafted(payload: &PullRequestPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let pull = &payload.pull_request;
    let spec = EmbedSpec {
        title: format!(
            "[{}] Pull request marked as draft: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(pull.html_url.clone()),
        color: colors::PULL_DRAFT,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_ready(payload: &PullRequestPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let pull = &payload.pull_request;
    let spec = EmbedSpec {
        title: format!(
            "[{}] Pull request marked for review: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(pull.html_url.clone()),
        color: colors::PULL_OPEN,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_enqueued(payload: &PullRequestPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let pull = &payload.pull_request;
    let queue_url = merge_queue_url(payload);
    let spec = EmbedSpec {
        title: format!(
            "[{}] Pull request enqueued: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(pull.html_url.clone()),
        description: Some(format!(
            "[View `{}` merge queue]({queue_url})",
            pull.base.ref_name
        )),
        color: colors::PULL_ENQUEUED,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_dequeued(payload: &PullRequestPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let pull = &payload.pull_request;
    let queue_url = merge_queue_url(payload);
    let spec = EmbedSpec {
        title: format!(
            "[{}] Pull request dequeued: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(pull.html_url.clone()),
        description: Some(format!(
            "[View `{}` merge queue]({queue_url})",
            pull.base.ref_name
        )),
        color: colors::PULL_DEQUEUED,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn merge_queue_url(payload: &PullRequestPayload) -> String {
    format!(
        "{}/queue/{}",
        payload.repository.html_url, payload.pull_request.base.ref_name
    )
}

fn pull_kind(draft: bool) -> (&'static str, u32) {
    if draft {
        ("Draft pull request", colors::PULL_DRAFT)
    } else {
        ("Pull request", colors::PULL_OPEN)
    }
}

fn build_pull_review(
    payload: &PullRequestReviewPayload,
    action: &str,
    config: &RelayConfig,
) -> Option<WebhookBody> {
    let review = &payload.review;
    let (state, color) = match review.state.as_str() {
        "approved" => ("approved", colors::REVIEW_APPROVED),
        "changes_requested" => ("changes requested", colors::REVIEW_CHANGES),
        _ if action == "dismissed" => ("review dismissed", colors::REVIEW_NEUTRAL),
        _ => ("reviewed", colors::REVIEW_NEUTRAL),
    };

    let pull = &payload.pull_request;
    let spec = EmbedSpec {
        title: format!(
            "[{}] Pull request {state}: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(review.html_url.clone()),
        description: review.body.clone(),
        color,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_pull_review_comment(
    payload: &PullRequestReviewCommentPayload,
    config: &RelayConfig,
) -> Option<WebhookBody> {
    let pull = &payload.pull_request;
    let spec = EmbedSpec {
        title: format!(
            "[{}] Pull request review comment: #{} {}",
            payload.repository.full_name, pull.number, pull.title
        ),
        url: Some(payload.comment.html_url.clone()),
        description: payload.comment.body.clone(),
        color: colors::REVIEW_NEUTRAL,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_issue_opened(payload: &IssuesPayload, config: &RelayConfig) -> Option<WebhookBody> {
    if config.is_ignored_user(&payload.sender.login) {
        return None;
    }
    let issue = &payload.issue;
    let spec = EmbedSpec {
        title: format!(
            "[{}] Issue opened: #{} {}",
            payload.repository.full_name, issue.number, issue.title
        ),
        url: Some(issue.html_url.clone()),
        description: issue.body.clone(),
        color: colors::ISSUE_OPEN,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_issue_reopened(payload: &IssuesPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let issue = &payload.issue;
    let spec = EmbedSpec {
        title: format!(
            "[{}] Issue reopened: #{} {}",
            payload.repository.full_name, issue.number, issue.title
        ),
        url: Some(issue.html_url.clone()),
        color: colors::ISSUE_OPEN,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_issue_closed(payload: &IssuesPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let issue = &payload.issue;
    let closed = match &issue.state_reason {
        Some(reason) => format!("Issue closed as {}", reason.replace('_', " ")),
        None => "Issue closed".to_string(),
    };
    let spec = EmbedSpec {
        title: format!(
            "[{}] {closed}: #{} {}",
            payload.repository.full_name, issue.number, issue.title
        ),
        url: Some(issue.html_url.clone()),
        color: colors::ISSUE_CLOSED,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_issue_comment(payload: &IssueCommentPayload, config: &RelayConfig) -> Option<WebhookBody> {
    if config.is_ignored_user(&payload.sender.login) {
        return None;
    }
    let issue = &payload.issue;
    let entity = if issue.pull_request.is_some() {
        "pull request"
    } else {
        "issue"
    };
    let spec = EmbedSpec {
        title: format!(
            "[{}] New comment on {entity}: #{} {}",
            payload.repository.full_name, issue.number, issue.title
        ),
        url: Some(payload.comment.html_url.clone()),
        description: payload.comment.body.clone(),
        color: colors::ISSUE_COMMENT,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_commit_comment(
    payload: &CommitCommentPayload,
    config: &RelayConfig,
) -> Option<WebhookBody> {
    if config.is_ignored_user(&payload.sender.login) {
        return None;
    }
    let sha = payload.comment.commit_id.as_deref()?;
    let spec = EmbedSpec {
        title: format!(
            "[{}] New comment on commit `{}`",
            payload.repository.full_name,
            short_commit(sha)
        ),
        url: Some(payload.comment.html_url.clone()),
        description: payload.comment.body.clone(),
        color: colors::COMMIT_COMMENT,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_discussion(payload: &DiscussionPayload, config: &RelayConfig) -> Option<WebhookBody> {
    if config.is_ignored_user(&payload.sender.login) {
        return None;
    }
    let discussion = &payload.discussion;
    let spec = EmbedSpec {
        title: format!(
            "[{}] New discussion: #{} {}",
            payload.repository.full_name, discussion.number, discussion.title
        ),
        url: Some(discussion.html_url.clone()),
        description: discussion.body.clone(),
        footer: Some(format!(
            "Discussion Category: {}",
            discussion.category.name
        )),
        color: colors::DISCUSSION,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_discussion_comment(
    payload: &DiscussionCommentPayload,
    config: &RelayConfig,
) -> Option<WebhookBody> {
    if config.is_ignored_user(&payload.sender.login) {
        return None;
    }
    let discussion = &payload.discussion;
    let spec = EmbedSpec {
        title: format!(
            "[{}] New comment on discussion: #{} {}",
            payload.repository.full_name, discussion.number, discussion.title
        ),
        url: Some(payload.comment.html_url.clone()),
        description: payload.comment.body.clone(),
        footer: Some(format!(
            "Discussion Category: {}",
            discussion.category.name
        )),
        color: colors::DISCUSSION_COMMENT,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_ref_created(payload: &RefChangePayload, config: &RelayConfig) -> Option<WebhookBody> {
    if config.is_ignored_user(&payload.sender.login) {
        return None;
    }
    if payload.ref_type == "branch" && config.is_ignored_branch(&payload.git_ref) {
        return None;
    }
    let spec = EmbedSpec {
        title: format!(
            "[{}] New {} created: {}",
            payload.repository.full_name, payload.ref_type, payload.git_ref
        ),
        color: colors::BRANCH_CREATE,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_ref_deleted(payload: &RefChangePayload, config: &RelayConfig) -> Option<WebhookBody> {
    if payload.ref_type == "branch" && config.is_ignored_branch(&payload.git_ref) {
        return None;
    }
    let spec = EmbedSpec {
        title: format!(
            "[{}] {} deleted: {}",
            payload.repository.full_name, payload.ref_type, payload.git_ref
        ),
        color: colors::BRANCH_DELETE,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_check(payload: &CheckRunPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let check = &payload.check_run;
    let repository = payload.repository.as_ref()?;
    let head_branch = check.check_suite.head_branch.as_deref()?;

    if config.is_ignored_branch(head_branch) {
        return None;
    }

    // Report against the pull request when the suite belongs to one in the
    // delivering repository, otherwise against the branch.
    let mut target = head_branch.to_string();
    if let Some(pull) = check.check_suite.pull_requests.first() {
        let repo_api_prefix = format!(
            "https://api.github.com/repos/{}",
            repository.full_name
        );
        if pull.url.starts_with(&repo_api_prefix) {
            target = format!("PR #{}", pull.number);
        }
    }

    let (color, status) = match check.conclusion.as_deref() {
        Some("success") => (colors::CHECK_SUCCESS, "succeeded"),
        Some("failure") => (colors::CHECK_FAILURE, "failed"),
        Some("cancelled") => (colors::CHECK_FAILURE, "cancelled"),
        Some("timed_out") => (colors::CHECK_WARNING, "timed out"),
        Some("action_required") => (colors::CHECK_WARNING, "requires action"),
        Some("stale") => (colors::CHECK_WARNING, "became stale"),
        Some("neutral") => (colors::CHECK_NEUTRAL, "didn't run"),
        Some("skipped") => (colors::CHECK_NEUTRAL, "was skipped"),
        _ => (colors::CHECK_NEUTRAL, "failed"),
    };

    let mut fields = vec![EmbedField {
        name: "Action Name".to_string(),
        value: check.name.clone(),
        inline: true,
    }];
    if let Some(title) = &check.output.title {
        fields.push(EmbedField {
            name: "Output Title".to_string(),
            value: truncate_field(title, CHECK_FIELD_LIMIT, config.hide_details),
            inline: true,
        });
    }
    if let Some(summary) = &check.output.summary {
        fields.push(EmbedField {
            name: "Output Summary".to_string(),
            value: truncate_field(summary, CHECK_FIELD_LIMIT, config.hide_details),
            inline: false,
        });
    }

    let spec = EmbedSpec {
        title: format!(
            "[{}] Actions check {status} on {target}",
            repository.full_name
        ),
        url: Some(check.html_url.clone()),
        fields,
        color,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_fork(payload: &ForkPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let spec = EmbedSpec {
        title: format!(
            "[{}] Fork Created: {}",
            payload.repository.full_name, payload.forkee.full_name
        ),
        url: Some(payload.forkee.html_url.clone()),
        color: colors::FORK,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_star(payload: &StarPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let spec = EmbedSpec {
        title: format!("[{}] New star added", payload.repository.full_name),
        url: Some(payload.repository.html_url.clone()),
        color: colors::STAR,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_package(
    payload: &PackagePayload,
    verb: &str,
    config: &RelayConfig,
) -> Option<WebhookBody> {
    let package = payload.package()?;
    let name = match &package.namespace {
        Some(namespace) => format!("{namespace}/{}", package.name),
        None => package.name.clone(),
    };
    let spec = EmbedSpec {
        title: format!(
            "[{}] Package {verb}: {name}",
            payload.repository.full_name
        ),
        url: Some(package.package_version.html_url.clone()),
        color: colors::PACKAGE,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_deployment(payload: &DeploymentPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let description = payload.deployment.description.clone().unwrap_or_default();
    let spec = EmbedSpec {
        title: format!(
            "[{}] Deployment started for {description}",
            payload.repository.full_name
        ),
        url: payload.deployment.web_url().map(str::to_string),
        color: colors::DEPLOY_START,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_deployment_status(
    payload: &DeploymentStatusPayload,
    config: &RelayConfig,
) -> Option<WebhookBody> {
    let (color, term) = match payload.deployment_status.state.as_str() {
        "success" => (colors::DEPLOY_SUCCESS, "succeeded"),
        "failure" => (colors::DEPLOY_FAILURE, "failed"),
        "error" => (colors::DEPLOY_FAILURE, "errored"),
        _ => return None,
    };
    let description = payload.deployment.description.clone().unwrap_or_default();
    let spec = EmbedSpec {
        title: format!(
            "[{}] Deployment for {description} {term}",
            payload.repository.full_name
        ),
        url: payload.deployment.web_url().map(str::to_string),
        color,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn build_wiki(payload: &WikiPayload, config: &RelayConfig) -> Option<WebhookBody> {
    let mut created = 0usize;
    let mut edited = 0usize;
    let mut lines = Vec::with_capacity(payload.pages.len());
    for page in &payload.pages {
        match page.action.as_str() {
            "created" => created += 1,
            "edited" => edited += 1,
            _ => {}
        }
        lines.push(format!(
            "{}: [{}]({})",
            capitalize(&page.action),
            page.title,
            page.html_url
        ));
    }

    if created == 0 && edited == 0 {
        return None;
    }

    let (message, color) = match (created, edited) {
        (1, 0) => ("A page was created".to_string(), colors::WIKI_CREATED),
        (0, 1) => ("A page was edited".to_string(), colors::WIKI_EDITED),
        (c, e) if c > 0 && e > 0 => (
            format!(
                "{c} page{} were created and {e} {} edited",
                if c > 1 { "s" } else { "" },
                if e > 1 { "were" } else { "was" }
            ),
            colors::WIKI_MIXED,
        ),
        (c, e) => (
            format!(
                "{} pages were {}",
                c.max(e),
                if c > 0 { "created" } else { "edited" }
            ),
            colors::WIKI_MIXED,
        ),
    };

    let spec = EmbedSpec {
        title: format!("[{}] {message}", payload.repository.full_name),
        url: Some(payload.repository.html_url.clone()),
        description: Some(lines.join("\n")),
        color,
        ..EmbedSpec::default()
    };
    Some(spec.into_body(&payload.sender, config))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo() -> Value {
        json!({
            "name": "widget",
            "full_name": "acme/widget",
            "html_url": "https://github.com/acme/widget"
        })
    }

    fn sender() -> Value {
        json!({
            "login": "octocat",
            "html_url": "https://github.com/octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/1"
        })
    }

    fn config_with(vars: &[(&str, &str)]) -> RelayConfig {
        let map: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RelayConfig::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    fn first_embed(body: WebhookBody) -> Embed {
        match body {
            WebhookBody::Embeds { embeds } => embeds.into_iter().next().unwrap(),
            WebhookBody::Content { .. } => panic!("expected an embed body"),
        }
    }

    fn build(event: &str, payload: &Value) -> Option<Embed> {
        build_embed(event, payload, &RelayConfig::default())
            .unwrap()
            .map(first_embed)
    }

    #[test]
    fn unhandled_event_is_a_noop() {
        let payload = json!({"repository": repo(), "sender": sender()});
        assert!(build("watch", &payload).is_none());
        assert!(build("label", &payload).is_none());
    }

    #[test]
    fn ignored_event_is_a_noop() {
        let config = config_with(&[("GITCORD_IGNORED_EVENTS", "star")]);
        let payload = json!({"action": "created", "repository": repo(), "sender": sender()});
        assert!(build_embed("star", &payload, &config).unwrap().is_none());
    }

    #[test]
    fn unhandled_action_is_a_noop() {
        let payload = json!({"action": "labeled", "repository": repo(), "sender": sender()});
        assert!(build("issues", &payload).is_none());
        assert!(build("pull_request", &payload).is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = build_embed("push", &json!({}), &RelayConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedPayload { ref event, .. } if event == "push"));
    }

    fn push_payload(commits: Value) -> Value {
        json!({
            "ref": "refs/heads/main",
            "after": "fedcba9876543210",
            "compare": "https://github.com/acme/widget/compare/aaa...bbb",
            "commits": commits,
            "repository": repo(),
            "sender": sender()
        })
    }

    fn commit(id: &str, message: &str) -> Value {
        json!({
            "id": id,
            "url": format!("https://github.com/acme/widget/commit/{id}"),
            "message": message,
            "author": {"username": "octocat"}
        })
    }

    #[test]
    fn push_lists_commits() {
        let payload = push_payload(json!([
            commit("0123456789abcdef", "Fix the frobnicator\n\nLonger body"),
            commit("89abcdef01234567", "Tweak docs"),
        ]));
        let embed = build("push", &payload).unwrap();

        assert_eq!(embed.title, "[widget:main] 2 new commits");
        assert_eq!(
            embed.url.as_deref(),
            Some("https://github.com/acme/widget/compare/aaa...bbb")
        );
        assert_eq!(embed.color, colors::PUSH);
        let description = embed.description.unwrap();
        assert!(description.contains("[`0123456`]"));
        assert!(description.contains("Fix the frobnicator"));
        assert!(!description.contains("Longer body"));
        assert!(description.contains("- octocat"));
    }

    #[test]
    fn push_single_commit_links_the_commit() {
        let payload = push_payload(json!([commit("0123456789abcdef", "Only change")]));
        let embed = build("push", &payload).unwrap();

        assert_eq!(embed.title, "[widget:main] 1 new commit");
        assert_eq!(
            embed.url.as_deref(),
            Some("https://github.com/acme/widget/commit/0123456789abcdef")
        );
    }

    #[test]
    fn push_without_commits_is_a_noop() {
        assert!(build("push", &push_payload(json!([]))).is_none());
    }

    #[test]
    fn push_commit_list_is_capped() {
        let commits: Vec<Value> = (0..60)
            .map(|i| commit(&format!("{i:016x}"), &"long message ".repeat(10)))
            .collect();
        let embed = build("push", &push_payload(json!(commits))).unwrap();

        let description = embed.description.unwrap();
        assert!(description.chars().count() < PUSH_LIST_LIMIT + 200);
        assert!(embed.title.starts_with("[widget:main] 60 new commits"));
    }

    #[test]
    fn push_on_ignored_branch_is_dropped() {
        let config = config_with(&[("GITCORD_IGNORED_BRANCHES", "main")]);
        let payload = push_payload(json!([commit("0123456789abcdef", "msg")]));
        assert!(build_embed("push", &payload, &config).unwrap().is_none());
    }

    #[test]
    fn push_from_ignored_user_is_dropped() {
        let config = config_with(&[("GITCORD_IGNORED_USERS", "octocat")]);
        let payload = push_payload(json!([commit("0123456789abcdef", "msg")]));
        assert!(build_embed("push", &payload, &config).unwrap().is_none());
    }

    #[test]
    fn force_push_reports_new_head() {
        let mut payload = push_payload(json!([]));
        payload["forced"] = json!(true);
        let embed = build("push", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] Branch main was force-pushed to `fedcba9`"
        );
        assert_eq!(
            embed.url.as_deref(),
            Some("https://github.com/acme/widget/compare/aaa..bbb")
        );
        assert_eq!(embed.color, colors::FORCE_PUSH);
    }

    #[test]
    fn issue_opened_carries_truncated_body() {
        let payload = json!({
            "action": "opened",
            "issue": {
                "number": 42,
                "title": "Crash on startup",
                "html_url": "https://github.com/acme/widget/issues/42",
                "body": "a".repeat(1200)
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("issues", &payload).unwrap();

        assert_eq!(embed.title, "[acme/widget] Issue opened: #42 Crash on startup");
        assert_eq!(embed.color, colors::ISSUE_OPEN);
        let description = embed.description.unwrap();
        assert!(description.ends_with("..."));
        assert!(description.chars().count() <= DESCRIPTION_LIMIT + 3);
    }

    #[test]
    fn issue_closed_includes_state_reason() {
        let payload = json!({
            "action": "closed",
            "issue": {
                "number": 42,
                "title": "Crash on startup",
                "html_url": "https://github.com/acme/widget/issues/42",
                "state_reason": "not_planned"
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("issues", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] Issue closed as not planned: #42 Crash on startup"
        );
        assert_eq!(embed.color, colors::ISSUE_CLOSED);
    }

    #[test]
    fn issue_comment_distinguishes_pull_requests() {
        let payload = json!({
            "action": "created",
            "issue": {
                "number": 7,
                "title": "Add dark mode",
                "html_url": "https://github.com/acme/widget/pull/7",
                "pull_request": {"url": "https://api.github.com/repos/acme/widget/pulls/7"}
            },
            "comment": {
                "html_url": "https://github.com/acme/widget/pull/7#issuecomment-1",
                "body": "Looks good"
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("issue_comment", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] New comment on pull request: #7 Add dark mode"
        );
    }

    fn pull_request(draft: bool, merged: bool) -> Value {
        json!({
            "number": 7,
            "title": "Add dark mode",
            "html_url": "https://github.com/acme/widget/pull/7",
            "body": "Adds a toggle",
            "draft": draft,
            "merged": merged,
            "base": {"ref": "main"}
        })
    }

    #[test]
    fn draft_pull_request_opened() {
        let payload = json!({
            "action": "opened",
            "pull_request": pull_request(true, false),
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("pull_request", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] Draft pull request opened: #7 Add dark mode"
        );
        assert_eq!(embed.color, colors::PULL_DRAFT);
    }

    #[test]
    fn merged_pull_request_closed() {
        let payload = json!({
            "action": "closed",
            "pull_request": pull_request(false, true),
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("pull_request", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] Pull request merged: #7 Add dark mode"
        );
        assert_eq!(embed.color, colors::PULL_MERGED);
        // Close embeds carry no body even when the pull request has one.
        assert!(embed.description.is_none());
    }

    #[test]
    fn enqueued_pull_request_links_merge_queue() {
        let payload = json!({
            "action": "enqueued",
            "pull_request": pull_request(false, false),
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("pull_request", &payload).unwrap();

        assert_eq!(embed.color, colors::PULL_ENQUEUED);
        assert_eq!(
            embed.description.as_deref(),
            Some("[View `main` merge queue](https://github.com/acme/widget/queue/main)")
        );
    }

    #[test]
    fn approved_review_is_green() {
        let payload = json!({
            "action": "submitted",
            "pull_request": pull_request(false, false),
            "review": {
                "state": "approved",
                "html_url": "https://github.com/acme/widget/pull/7#pullrequestreview-1",
                "body": "Ship it"
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("pull_request_review", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] Pull request approved: #7 Add dark mode"
        );
        assert_eq!(embed.color, colors::REVIEW_APPROVED);
        assert_eq!(embed.description.as_deref(), Some("Ship it"));
    }

    #[test]
    fn dismissed_review_is_reported() {
        let payload = json!({
            "action": "dismissed",
            "pull_request": pull_request(false, false),
            "review": {
                "state": "commented",
                "html_url": "https://github.com/acme/widget/pull/7#pullrequestreview-1"
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("pull_request_review", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] Pull request review dismissed: #7 Add dark mode"
        );
        assert_eq!(embed.color, colors::REVIEW_NEUTRAL);
    }

    fn check_payload(conclusion: &str, pulls: Value) -> Value {
        json!({
            "action": "completed",
            "check_run": {
                "name": "build",
                "conclusion": conclusion,
                "html_url": "https://github.com/acme/widget/runs/1",
                "output": {"title": "42 tests passed", "summary": "All green"},
                "check_suite": {
                    "head_branch": "main",
                    "pull_requests": pulls
                }
            },
            "repository": repo(),
            "sender": sender()
        })
    }

    #[test]
    fn successful_check_reports_against_pull_request() {
        let pulls = json!([{
            "number": 5,
            "url": "https://api.github.com/repos/acme/widget/pulls/5"
        }]);
        let embed = build("check_run", &check_payload("success", pulls)).unwrap();

        assert_eq!(embed.title, "[acme/widget] Actions check succeeded on PR #5");
        assert_eq!(embed.color, colors::CHECK_SUCCESS);
        assert_eq!(embed.fields.len(), 3);
        assert_eq!(embed.fields[0].name, "Action Name");
        assert_eq!(embed.fields[0].value, "build");
        assert!(embed.fields[0].inline);
        assert!(!embed.fields[2].inline);
    }

    #[test]
    fn check_against_foreign_pull_request_uses_branch() {
        let pulls = json!([{
            "number": 9,
            "url": "https://api.github.com/repos/elsewhere/fork/pulls/9"
        }]);
        let embed = build("check_run", &check_payload("failure", pulls)).unwrap();

        assert_eq!(embed.title, "[acme/widget] Actions check failed on main");
        assert_eq!(embed.color, colors::CHECK_FAILURE);
    }

    #[test]
    fn check_without_head_branch_is_a_noop() {
        let payload = json!({
            "action": "completed",
            "check_run": {
                "name": "build",
                "conclusion": "success",
                "html_url": "https://github.com/acme/widget/runs/1",
                "output": {},
                "check_suite": {"head_branch": null, "pull_requests": []}
            },
            "repository": repo(),
            "sender": sender()
        });
        assert!(build("check_run", &payload).is_none());
    }

    #[test]
    fn release_draft_is_skipped() {
        let payload = json!({
            "action": "released",
            "release": {
                "tag_name": "v1.0.0",
                "html_url": "https://github.com/acme/widget/releases/v1.0.0",
                "draft": true
            },
            "repository": repo(),
            "sender": sender()
        });
        assert!(build("release", &payload).is_none());
    }

    #[test]
    fn prerelease_falls_back_to_tag_name() {
        let payload = json!({
            "action": "prereleased",
            "release": {
                "tag_name": "v1.0.0-rc.1",
                "html_url": "https://github.com/acme/widget/releases/v1.0.0-rc.1",
                "prerelease": true
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("release", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] New prerelease published: v1.0.0-rc.1"
        );
        assert_eq!(embed.color, colors::RELEASE);
    }

    #[test]
    fn ping_uses_org_login_for_org_hooks() {
        let payload = json!({
            "zen": "Keep it logically awesome.",
            "hook": {"type": "Organization"},
            "organization": {"login": "acme"},
            "sender": sender()
        });
        let embed = build("ping", &payload).unwrap();

        assert_eq!(embed.title, "[acme] Organization hook ping received");
        assert_eq!(embed.description.as_deref(), Some("Keep it logically awesome."));
    }

    #[test]
    fn branch_delete_has_no_url() {
        let payload = json!({
            "ref": "feature/login",
            "ref_type": "branch",
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("delete", &payload).unwrap();

        assert_eq!(embed.title, "[acme/widget] branch deleted: feature/login");
        assert!(embed.url.is_none());
        assert_eq!(embed.color, colors::BRANCH_DELETE);
    }

    #[test]
    fn tag_create_skips_branch_filter() {
        let config = config_with(&[("GITCORD_IGNORED_BRANCHES", "v1.0.0")]);
        let payload = json!({
            "ref": "v1.0.0",
            "ref_type": "tag",
            "repository": repo(),
            "sender": sender()
        });
        let embed = build_embed("create", &payload, &config)
            .unwrap()
            .map(first_embed)
            .unwrap();
        assert_eq!(embed.title, "[acme/widget] New tag created: v1.0.0");
    }

    #[test]
    fn wiki_single_page_created() {
        let payload = json!({
            "pages": [{
                "action": "created",
                "title": "Home",
                "html_url": "https://github.com/acme/widget/wiki/Home"
            }],
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("gollum", &payload).unwrap();

        assert_eq!(embed.title, "[acme/widget] A page was created");
        assert_eq!(embed.color, colors::WIKI_CREATED);
        assert_eq!(
            embed.description.as_deref(),
            Some("Created: [Home](https://github.com/acme/widget/wiki/Home)")
        );
    }

    #[test]
    fn wiki_mixed_actions_are_summed() {
        let payload = json!({
            "pages": [
                {"action": "created", "title": "A", "html_url": "https://example.com/A"},
                {"action": "created", "title": "B", "html_url": "https://example.com/B"},
                {"action": "edited", "title": "C", "html_url": "https://example.com/C"}
            ],
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("gollum", &payload).unwrap();

        assert_eq!(
            embed.title,
            "[acme/widget] 2 pages were created and 1 was edited"
        );
        assert_eq!(embed.color, colors::WIKI_MIXED);
    }

    #[test]
    fn deployment_status_only_reports_terminal_states() {
        let base = json!({
            "deployment": {"description": "production", "payload": {"web_url": "https://widget.example.com"}},
            "repository": repo(),
            "sender": sender()
        });

        let mut success = base.clone();
        success["deployment_status"] = json!({"state": "success"});
        let embed = build("deployment_status", &success).unwrap();
        assert_eq!(embed.title, "[acme/widget] Deployment for production succeeded");
        assert_eq!(embed.color, colors::DEPLOY_SUCCESS);
        assert_eq!(embed.url.as_deref(), Some("https://widget.example.com"));

        let mut pending = base;
        pending["deployment_status"] = json!({"state": "pending"});
        assert!(build("deployment_status", &pending).is_none());
    }

    #[test]
    fn package_name_includes_namespace() {
        let payload = json!({
            "action": "published",
            "registry_package": {
                "namespace": "acme",
                "name": "widget",
                "package_version": {"html_url": "https://github.com/acme/widget/packages/1"}
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("registry_package", &payload).unwrap();

        assert_eq!(embed.title, "[acme/widget] Package Published: acme/widget");
        assert_eq!(embed.color, colors::PACKAGE);
    }

    #[test]
    fn author_block_is_filled_from_sender() {
        let payload = json!({
            "action": "created",
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("star", &payload).unwrap();

        assert_eq!(embed.author.name, "octocat");
        assert_eq!(embed.author.url, "https://github.com/octocat");
        assert!(embed.author.icon_url.starts_with("https://avatars.githubusercontent.com/u/1?="));
    }

    #[test]
    fn description_details_are_spoilered() {
        let payload = json!({
            "action": "opened",
            "issue": {
                "number": 1,
                "title": "Bug",
                "html_url": "https://github.com/acme/widget/issues/1",
                "body": "<details><summary>Trace</summary>stack line</details>"
            },
            "repository": repo(),
            "sender": sender()
        });
        let embed = build("issues", &payload).unwrap();
        assert_eq!(
            embed.description.as_deref(),
            Some("**Trace**:\n ||stack line||")
        );
    }
}
