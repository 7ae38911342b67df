//! Embed field preparation.
//!
//! GitHub bodies arrive as markdown with HTML mixed in. Before a value is
//! placed into an embed slot it is cleaned (HTML comments dropped,
//! `<details>` blocks rewritten as Discord spoilers) and, when it exceeds the
//! slot's limit, shortened through the formatting-preserving engine in
//! [`crate::markdown`].

use crate::markdown::truncate_markdown;
use regex::Regex;
use std::sync::LazyLock;

/// How many times the engine is re-invoked with a smaller limit when its
/// output still exceeds the requested one (markers and link URLs are free in
/// its budget, so the raw length can overshoot).
const MAX_TRUNCATION_ATTEMPTS: usize = 5;
/// Fixed reduction applied to the effective limit on each retry.
const RETRY_LIMIT_DECREMENT: usize = 20;

static HTML_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->[\r\n]*").expect("static pattern"));
static DETAILS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)<details>\s*<summary>(.*?)</summary>(.*?)</details>")
        .expect("static pattern")
});
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static pattern"));
static HORIZONTAL_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("static pattern"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("static pattern"));

/// Clean a field value and fit it to `limit` characters.
///
/// HTML comments never reach the output. `<details>` blocks become
/// `**summary**:` followed by the spoilered body, or just the summary line
/// when `hide_details` is set. Text already within the limit is returned
/// untouched; longer text goes through the truncation engine with an
/// ellipsis.
///
/// Absent fields are handled at call sites with `Option::map`, so a missing
/// body stays missing instead of becoming an empty string.
pub fn truncate_field(text: &str, limit: usize, hide_details: bool) -> String {
    let stripped = HTML_COMMENT_RE.replace_all(text, "");
    let cleaned = rewrite_details(&stripped, hide_details);
    if cleaned.chars().count() <= limit {
        return cleaned;
    }

    let mut effective = limit;
    let mut output = truncate_markdown(&cleaned, effective, true);
    for _ in 1..MAX_TRUNCATION_ATTEMPTS {
        if output.chars().count() <= limit {
            return output;
        }
        effective = effective.saturating_sub(RETRY_LIMIT_DECREMENT);
        output = truncate_markdown(&cleaned, effective, true);
    }

    if output.chars().count() > limit {
        tracing::warn!(
            limit,
            actual = output.chars().count(),
            "field still over limit after {MAX_TRUNCATION_ATTEMPTS} attempts, sending best effort"
        );
    }
    output
}

/// Rewrite `<details><summary>..</summary>..</details>` blocks as spoilers.
///
/// Tags inside the summary and body are stripped, whitespace runs and blank
/// lines in the body collapsed. Nested `<details>` is not handled.
fn rewrite_details(text: &str, hide_details: bool) -> String {
    DETAILS_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let summary = HTML_TAG_RE.replace_all(&caps[1], "");
            let summary = summary.trim();
            let body = HTML_TAG_RE.replace_all(&caps[2], "");
            let body = HORIZONTAL_WS_RE.replace_all(&body, " ");
            let body = BLANK_LINES_RE.replace_all(&body, "\n");
            let body = body.trim();
            if hide_details || body.is_empty() {
                format!("**{summary}**:")
            } else {
                format!("**{summary}**:\n ||{body}||")
            }
        })
        .into_owned()
}
