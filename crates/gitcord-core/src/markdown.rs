//! Formatting-preserving markdown truncation.
//!
//! Discord renders embed text as markdown, so a naive cut can leave an
//! unterminated bold span or a half-eaten `[label](url)` link that corrupts
//! the whole message. [`truncate_markdown`] shortens text to a visible
//! character budget while keeping formatting balanced:
//!
//! - paired emphasis/code markers are protected behind sentinel characters
//!   before the scan, so the cut can never land inside a token;
//! - markers still open at the cut point are closed, last-opened first;
//! - hyperlink URLs are never cut and never charged against the budget —
//!   only the label is truncated, recursively, under the same budget.
//!
//! The function is total: any string, any limit, never panics. It does not
//! repair markdown that was already unbalanced on the way in.

use regex::Regex;
use std::sync::LazyLock;

/// Sentinel standing in for an escaped `\*` during the scan.
const ESCAPED_ASTERISK_SENTINEL: &str = "\u{F8F0}";
/// Sentinel standing in for an escaped `\_` during the scan.
const ESCAPED_UNDERSCORE_SENTINEL: &str = "\u{F8F1}";

static ESCAPED_ASTERISK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\*").expect("static pattern"));
static ESCAPED_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\_").expect("static pattern"));

/// `[label](url)` anchored at the scan position. Labels don't nest.
static HYPERLINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\[]+)\]\(([^)]+)\)").expect("static pattern"));

/// A markdown formatting marker category.
///
/// Declaration order is the protection priority: bold before italic so that
/// `**` is never misread as two italic `*` tokens, emphasis before code so
/// code sentinels wrap whatever emphasis left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    BoldUnderscore,
    BoldAsterisk,
    ItalicUnderscore,
    ItalicAsterisk,
    CodeFence,
    CodeInline,
}

impl Marker {
    const PRIORITY: [Marker; 6] = [
        Marker::BoldUnderscore,
        Marker::BoldAsterisk,
        Marker::ItalicUnderscore,
        Marker::ItalicAsterisk,
        Marker::CodeFence,
        Marker::CodeInline,
    ];

    /// The literal token as it appears in markdown.
    fn literal(self) -> &'static str {
        match self {
            Marker::BoldUnderscore => "__",
            Marker::BoldAsterisk => "**",
            Marker::ItalicUnderscore => "_",
            Marker::ItalicAsterisk => "*",
            Marker::CodeFence => "```",
            Marker::CodeInline => "`",
        }
    }

    /// Private-use sentinel substituted for the token during the scan.
    /// Single characters, so they can never be split by a cut.
    fn sentinel(self) -> &'static str {
        match self {
            Marker::BoldUnderscore => "\u{F8F2}",
            Marker::BoldAsterisk => "\u{F8F3}",
            Marker::ItalicUnderscore => "\u{F8F4}",
            Marker::ItalicAsterisk => "\u{F8F5}",
            Marker::CodeFence => "\u{F8F6}",
            Marker::CodeInline => "\u{F8F7}",
        }
    }

    /// Matches a complete `token ... token` pair. Code spans may cross
    /// newlines; emphasis pairs must sit on one line.
    fn pair_pattern(self) -> &'static Regex {
        static PATTERNS: LazyLock<[Regex; 6]> = LazyLock::new(|| {
            [
                Regex::new(r"__(.*?)__").expect("static pattern"),
                Regex::new(r"\*\*(.*?)\*\*").expect("static pattern"),
                Regex::new(r"_(.*?)_").expect("static pattern"),
                Regex::new(r"\*(.*?)\*").expect("static pattern"),
                Regex::new(r"(?s)```(.*?)```").expect("static pattern"),
                Regex::new(r"(?s)`(.*?)`").expect("static pattern"),
            ]
        });
        &PATTERNS[self as usize]
    }

    /// The marker whose sentinel `rest` starts with, if any.
    fn at(rest: &str) -> Option<Marker> {
        Marker::PRIORITY
            .into_iter()
            .find(|marker| rest.starts_with(marker.sentinel()))
    }
}

/// Truncate `text` to at most `limit` visible characters without breaking
/// markdown formatting.
///
/// Structural marker tokens and hyperlink URLs are free; ordinary characters
/// and escaped markers each cost one. When `ellipsis` is set and anything was
/// cut, a literal `...` is appended after open markers are closed.
///
/// Text already within the limit is returned unchanged.
pub fn truncate_markdown(text: &str, limit: usize, ellipsis: bool) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let protected = protect_markers(text);
    let mut used = 0;
    let kept = scan(&protected, limit, &mut used);
    let mut output = restore_markers(&kept);
    // Shorter output means something was cut; closing markers pulled forward
    // from later in the text can make the lengths equal, which is a full keep.
    if ellipsis && output.len() < text.len() {
        output.push_str("...");
    }
    output
}

/// Replace escaped markers, then complete marker pairs, with sentinels.
fn protect_markers(text: &str) -> String {
    let mut out = ESCAPED_UNDERSCORE_RE
        .replace_all(text, ESCAPED_UNDERSCORE_SENTINEL)
        .into_owned();
    out = ESCAPED_ASTERISK_RE
        .replace_all(&out, ESCAPED_ASTERISK_SENTINEL)
        .into_owned();
    for marker in Marker::PRIORITY {
        let replacement = format!("{s}${{1}}{s}", s = marker.sentinel());
        out = marker
            .pair_pattern()
            .replace_all(&out, replacement.as_str())
            .into_owned();
    }
    out
}

/// Invert [`protect_markers`].
fn restore_markers(text: &str) -> String {
    let mut out = text
        .replace(ESCAPED_UNDERSCORE_SENTINEL, "\\_")
        .replace(ESCAPED_ASTERISK_SENTINEL, "\\*");
    for marker in Marker::PRIORITY {
        out = out.replace(marker.sentinel(), marker.literal());
    }
    out
}

/// Left-to-right scan over sentinel-protected text.
///
/// `used` is the shared visible-character budget, threaded through hyperlink
/// label recursion. Returns the kept text, trailing whitespace trimmed, open
/// markers closed in reverse order.
fn scan(text: &str, limit: usize, used: &mut usize) -> String {
    let mut stack: Vec<Marker> = Vec::new();
    let mut out = String::with_capacity(text.len());
    let mut index = 0;

    while *used < limit && index < text.len() {
        let rest = &text[index..];

        if let Some(marker) = Marker::at(rest) {
            // Structural token: emit and toggle, no budget charge.
            out.push_str(marker.sentinel());
            index += marker.sentinel().len();
            if stack.last() == Some(&marker) {
                stack.pop();
            } else {
                stack.push(marker);
            }
            continue;
        }

        if let Some(sentinel) = escape_at(rest) {
            // An escaped marker renders as a single visible character.
            out.push_str(sentinel);
            index += sentinel.len();
            *used += 1;
            continue;
        }

        if let Some(caps) = HYPERLINK_RE.captures(rest) {
            let span_len = caps[0].len();
            let url = &caps[2];
            let label = scan(&caps[1], limit, used);
            out.push('[');
            out.push_str(&label);
            out.push_str("](");
            out.push_str(url);
            out.push(')');
            index += span_len;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        out.push(ch);
        index += ch.len_utf8();
        *used += 1;
    }

    let mut out = out.trim_end().to_string();
    while let Some(marker) = stack.pop() {
        out.push_str(marker.sentinel());
    }
    out
}

fn escape_at(rest: &str) -> Option<&'static str> {
    if rest.starts_with(ESCAPED_UNDERSCORE_SENTINEL) {
        Some(ESCAPED_UNDERSCORE_SENTINEL)
    } else if rest.starts_with(ESCAPED_ASTERISK_SENTINEL) {
        Some(ESCAPED_ASTERISK_SENTINEL)
    } else {
        None
    }
}
