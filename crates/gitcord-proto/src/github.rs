//! GitHub webhook payload models.
//!
//! Only the fields the embed builders actually read are modeled; everything
//! else in a delivery is ignored during deserialization. Fields GitHub may
//! omit or null out are `Option`.

use serde::Deserialize;

/// The repository a delivery refers to.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Short name, e.g. `disgit`.
    pub name: String,
    /// Owner-qualified name, e.g. `JRoy/disgit`.
    pub full_name: String,
    pub html_url: String,
}

/// The user that triggered the delivery (or authored the commented entity).
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    pub html_url: String,
    pub avatar_url: String,
}

/// Organization block, present on org-level hooks.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: String,
}

/// Webhook metadata from `ping` deliveries.
#[derive(Debug, Clone, Deserialize)]
pub struct Hook {
    /// `Repository` or `Organization`.
    #[serde(rename = "type")]
    pub hook_type: String,
}

/// An issue, or the issue-shaped half of a pull request in comment events.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    /// `completed`, `not_planned`, ... — set when the issue is closed.
    #[serde(default)]
    pub state_reason: Option<String>,
    /// Present when the "issue" is actually a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

/// A comment on an issue, pull request, commit, or discussion.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    /// Only set for commit comments.
    #[serde(default)]
    pub commit_id: Option<String>,
}

/// A pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub merged: bool,
    pub base: GitRef,
}

/// One end of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
}

/// A submitted or dismissed pull request review.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    /// `approved`, `changes_requested`, `commented`, `dismissed`.
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// A commit inside a `push` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PushCommit {
    pub id: String,
    pub url: String,
    pub message: String,
    pub author: CommitAuthor,
}

/// Author block on a push commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A published release.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

/// A completed check run.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    pub name: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub html_url: String,
    pub output: CheckOutput,
    pub check_suite: CheckSuite,
}

/// Output block of a check run.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckOutput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Suite the check run belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSuite {
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequestRef>,
}

/// Minimal pull request reference inside a check suite.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    /// API url; used to confirm the PR belongs to the delivering repository.
    pub url: String,
}

/// A deployment. The `payload` block is deployer-defined free-form JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Deployment {
    /// The `web_url` field of the free-form payload, when present.
    pub fn web_url(&self) -> Option<&str> {
        self.payload.get("web_url").and_then(serde_json::Value::as_str)
    }
}

/// Status update for a deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentStatus {
    /// `success`, `failure`, `error`, `pending`, ...
    pub state: String,
}

/// A created or edited wiki page from a `gollum` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiPage {
    /// `created` or `edited`.
    pub action: String,
    pub title: String,
    pub html_url: String,
}

/// A (registry) package from `package` deliveries.
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub namespace: Option<String>,
    pub name: String,
    pub package_version: PackageVersion,
}

/// Version block of a package.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageVersion {
    pub html_url: String,
}

/// A discussion.
#[derive(Debug, Clone, Deserialize)]
pub struct Discussion {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    pub category: DiscussionCategory,
}

/// Category a discussion was filed under.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionCategory {
    pub name: String,
}

// ==================== Per-event payload envelopes ====================

/// `ping` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PingPayload {
    #[serde(default)]
    pub zen: Option<String>,
    pub hook: Hook,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub organization: Option<Organization>,
    pub sender: User,
}

/// `push` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PushPayload {
    /// Fully qualified ref, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
    #[serde(default)]
    pub forced: bool,
    /// Head sha after the push.
    pub after: String,
    pub compare: String,
    pub repository: Repository,
    pub sender: User,
}

/// `issues` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuesPayload {
    pub issue: Issue,
    pub repository: Repository,
    pub sender: User,
}

/// `issue_comment` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentPayload {
    pub issue: Issue,
    pub comment: Comment,
    pub repository: Repository,
    pub sender: User,
}

/// `commit_comment` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitCommentPayload {
    pub comment: Comment,
    pub repository: Repository,
    pub sender: User,
}

/// `pull_request` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub pull_request: PullRequest,
    pub repository: Repository,
    pub sender: User,
}

/// `pull_request_review` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewPayload {
    pub pull_request: PullRequest,
    pub review: Review,
    pub repository: Repository,
    pub sender: User,
}

/// `pull_request_review_comment` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviewCommentPayload {
    pub pull_request: PullRequest,
    pub comment: Comment,
    pub repository: Repository,
    pub sender: User,
}

/// `release` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleasePayload {
    pub release: Release,
    pub repository: Repository,
    pub sender: User,
}

/// `create` and `delete` deliveries.
#[derive(Debug, Clone, Deserialize)]
pub struct RefChangePayload {
    /// Short ref name, e.g. `feature/login`.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// `branch` or `tag`.
    pub ref_type: String,
    pub repository: Repository,
    pub sender: User,
}

/// `check_run` delivery. `repository` can be absent on app-level hooks.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunPayload {
    pub check_run: CheckRun,
    #[serde(default)]
    pub repository: Option<Repository>,
    pub sender: User,
}

/// `fork` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct ForkPayload {
    pub forkee: Repository,
    pub repository: Repository,
    pub sender: User,
}

/// `star` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct StarPayload {
    pub repository: Repository,
    pub sender: User,
}

/// `discussion` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionPayload {
    pub discussion: Discussion,
    pub repository: Repository,
    pub sender: User,
}

/// `discussion_comment` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscussionCommentPayload {
    pub discussion: Discussion,
    pub comment: Comment,
    pub repository: Repository,
    pub sender: User,
}

/// `package` / `registry_package` delivery. GitHub sends one of the two keys
/// depending on registry vintage.
#[derive(Debug, Clone, Deserialize)]
pub struct PackagePayload {
    #[serde(default)]
    pub package: Option<Package>,
    #[serde(default)]
    pub registry_package: Option<Package>,
    pub repository: Repository,
    pub sender: User,
}

impl PackagePayload {
    /// Whichever of the two package keys the delivery carried.
    pub fn package(&self) -> Option<&Package> {
        self.package.as_ref().or(self.registry_package.as_ref())
    }
}

/// `deployment` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentPayload {
    pub deployment: Deployment,
    pub repository: Repository,
    pub sender: User,
}

/// `deployment_status` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentStatusPayload {
    pub deployment: Deployment,
    pub deployment_status: DeploymentStatus,
    pub repository: Repository,
    pub sender: User,
}

/// `gollum` (wiki) delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiPayload {
    pub pages: Vec<WikiPage>,
    pub repository: Repository,
    pub sender: User,
}
