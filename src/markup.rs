// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Slack markup to intermediate Markdown.
//!
//! Slack's message dialect wraps references in angle brackets
//! (`<@U123>`, `<#C123>`, `<https://…|title>`) and uses `*bold*` and
//! `_italic_`. This module rewrites it into Markdown that
//! [`render_blocks`](crate::renderer::render_blocks) can consume.
//!
//! The rewrite is an ordered list of [`STAGES`]. Order is load-bearing:
//! hashtags must be emphasized before `#` is escaped, `*bold*` must be
//! promoted before `_italic_` is turned into `*italic*`, and so on. Each
//! stage is a pure function of its input text and the [`Directory`].
//!
//! # Example
//!
//! ```
//! use slack_export_viewer::directory::Directory;
//! use slack_export_viewer::markup::transform;
//!
//! let dir = Directory::default();
//! let md = transform("see <https://example.com|the docs> *now*", &dir);
//! assert_eq!(md, "see [the docs](https://example.com) **now**");
//! ```

use crate::directory::{Directory, DisplayName, NameSources};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// A named rewrite stage.
pub type Stage = (&'static str, fn(&str, &Directory) -> String);

/// The rewrite stages, in application order.
pub const STAGES: [Stage; 10] = [
    ("broadcasts", |text, _| expand_broadcasts(text)),
    ("emoji_aliases", |text, _| normalize_emoji_aliases(text)),
    ("annotated_mentions", |text, _| expand_annotated_mentions(text)),
    ("mentions", expand_mentions),
    ("hyperlinks", |text, _| expand_hyperlinks(text)),
    ("hashtags", |text, _| emphasize_hashtags(text)),
    ("channel_refs", expand_channel_refs),
    ("bold", |text, _| promote_bold(text)),
    ("italics", |text, _| convert_italics(text)),
    ("hashes", |text, _| escape_hashes(text)),
];

/// Slack emoji codes that the emoji table knows under another name.
const EMOJI_ALIASES: &[(&str, &str)] = &[(":simple_smile:", ":slightly_smiling_face:")];

/// Broadcast tokens and their display form.
const BROADCASTS: &[(&str, &str)] = &[
    ("<!channel>", "@channel"),
    ("<!here>", "@here"),
    ("<!everyone>", "@everyone"),
];

static ANNOTATED_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<@([UW][A-Z0-9]+)\|([^<>|]+)>").expect("annotated mention pattern is valid")
});

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@([UW][A-Z0-9]+)>").expect("mention pattern is valid"));

static HYPERLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<((?:https?|mailto):[^<>|\s]+)(?:\|([^<>]+))?>")
        .expect("hyperlink pattern is valid")
});

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\s)(#[A-Za-z0-9._\-]+)(\s|$)").expect("hashtag pattern is valid")
});

static CHANNEL_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<#(C[A-Z0-9]+)(?:\|([^<>]*))?>").expect("channel reference pattern is valid")
});

static ASTERISK_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\s)\*([^*#\n]+)\*(\s|$)").expect("asterisk span pattern is valid")
});

static UNDERSCORE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\s)_([^_#\n]+)_(\s|$)").expect("underscore span pattern is valid")
});

/// Markdown emphasis strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    /// `*text*`
    Em,
    /// `**text**`
    Strong,
}

impl Emphasis {
    const fn marker(self) -> &'static str {
        match self {
            Self::Em => "*",
            Self::Strong => "**",
        }
    }
}

/// Wraps text in Markdown emphasis markers.
#[must_use]
pub fn emphasize(text: &str, emphasis: Emphasis) -> String {
    let marker = emphasis.marker();
    format!("{marker}{text}{marker}")
}

/// Runs every stage over `text`.
#[must_use]
pub fn transform(text: &str, directory: &Directory) -> String {
    STAGES
        .iter()
        .fold(text.to_owned(), |acc, (_, stage)| stage(&acc, directory))
}

/// Replaces `<!channel>` (and `<!here>`, `<!everyone>`) with `@channel`.
#[must_use]
pub fn expand_broadcasts(text: &str) -> String {
    BROADCASTS
        .iter()
        .fold(text.to_owned(), |acc, (token, display)| acc.replace(token, display))
}

/// Renames Slack-only emoji codes to names the emoji table knows.
#[must_use]
pub fn normalize_emoji_aliases(text: &str) -> String {
    EMOJI_ALIASES
        .iter()
        .fold(text.to_owned(), |acc, (slack, canonical)| acc.replace(slack, canonical))
}

/// Rewrites `<@U123|bob>` as `@bob`, ignoring the directory.
#[must_use]
pub fn expand_annotated_mentions(text: &str) -> String {
    ANNOTATED_MENTION
        .replace_all(text, |caps: &Captures<'_>| format!("@{}", &caps[2]))
        .into_owned()
}

/// Rewrites `<@U123>` as `@name`, or as the bare id when the user is unknown.
#[must_use]
pub fn expand_mentions(text: &str, directory: &Directory) -> String {
    MENTION
        .replace_all(text, |caps: &Captures<'_>| {
            let id = &caps[1];
            match directory.resolve_name(NameSources::user(id)) {
                DisplayName::Profile(name) => format!("@{name}"),
                _ => id.to_owned(),
            }
        })
        .into_owned()
}

/// Rewrites `<https://url|title>` and `<https://url>` as Markdown links.
#[must_use]
pub fn expand_hyperlinks(text: &str) -> String {
    HYPERLINK
        .replace_all(text, |caps: &Captures<'_>| {
            let url = &caps[1];
            let title = caps.get(2).map_or(url, |title| title.as_str());
            format!("[{title}]({url})")
        })
        .into_owned()
}

/// Emphasizes whitespace-delimited `#word` tokens so they read as text,
/// not headings.
#[must_use]
pub fn emphasize_hashtags(text: &str) -> String {
    replace_delimited(text, &HASHTAG, |tag| emphasize(tag, Emphasis::Em))
}

/// Rewrites `<#C123>` as `*#channel-name*`.
///
/// Unknown ids fall back to the reference's own label, then to the raw id,
/// and are logged.
#[must_use]
pub fn expand_channel_refs(text: &str, directory: &Directory) -> String {
    CHANNEL_REF
        .replace_all(text, |caps: &Captures<'_>| {
            let id = &caps[1];
            let name = directory.channel_name(id).unwrap_or_else(|| {
                tracing::warn!(
                    channel_id = id,
                    "channel reference not found in channel directory"
                );
                caps.get(2)
                    .map(|label| label.as_str())
                    .filter(|label| !label.is_empty())
                    .unwrap_or(id)
            });
            emphasize(&format!("#{name}"), Emphasis::Em)
        })
        .into_owned()
}

/// Promotes Slack `*bold*` to Markdown `**bold**`.
#[must_use]
pub fn promote_bold(text: &str) -> String {
    replace_delimited(text, &ASTERISK_SPAN, |inner| {
        emphasize(inner, Emphasis::Strong)
    })
}

/// Converts Slack `_italic_` to Markdown `*italic*`.
#[must_use]
pub fn convert_italics(text: &str) -> String {
    replace_delimited(text, &UNDERSCORE_SPAN, |inner| emphasize(inner, Emphasis::Em))
}

/// Escapes every `#` so no line is read as a heading.
#[must_use]
pub fn escape_hashes(text: &str) -> String {
    text.replace('#', r"\#")
}

/// Rewrites spans matched by a `(boundary)(span)(boundary)` pattern,
/// keeping both boundaries verbatim.
///
/// A match consumes its trailing whitespace, which hides the leading
/// boundary of an adjacent span, so the pass repeats until nothing
/// matches. `rewrite` must produce text the pattern no longer matches.
fn replace_delimited(text: &str, pattern: &Regex, rewrite: impl Fn(&str) -> String) -> String {
    let mut current = text.to_owned();
    while pattern.is_match(&current) {
        current = pattern
            .replace_all(&current, |caps: &Captures<'_>| {
                format!("{}{}{}", &caps[1], rewrite(&caps[2]), &caps[3])
            })
            .into_owned();
    }
    current
}
