// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! HTML rendering for Slack message text.
//!
//! [`render_blocks`] turns the intermediate Markdown produced by
//! [`markup::transform`] into an HTML fragment, then applies the cosmetic
//! passes a chat row needs:
//!
//! 1. A lone wrapping `<p>` is removed
//! 2. Newlines become `<br />`, except around list markup
//! 3. `:emoji:` codes become Unicode glyphs
//! 4. Triple-backtick spans become styled `<pre>` blocks
//!
//! Emoji expansion runs before code styling, so codes inside backtick
//! spans are expanded too.
//!
//! # Example
//!
//! ```
//! use slack_export_viewer::directory::Directory;
//! use slack_export_viewer::renderer::Renderer;
//!
//! let dir = Directory::default();
//! let html = Renderer::new(&dir).render_text("*Deploy* done :smile:");
//! assert_eq!(html, "<strong>Deploy</strong> done 😄");
//! ```

use crate::directory::Directory;
use crate::markup;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Inline style for preformatted chat code.
const PRE_STYLE: &str = "background-color: #E6E5DF; white-space: pre-wrap;";

static LIST_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+(<(?:ul|ol|li)\b)").expect("list break pattern is valid"));

static EMOJI_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-z0-9_+\-]+):").expect("emoji pattern is valid"));

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(.*?)```").expect("code span pattern is valid"));

/// Renders Slack message text to HTML using a directory for lookups.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    directory: &'a Directory,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer over the given directory.
    #[must_use]
    pub const fn new(directory: &'a Directory) -> Self {
        Self { directory }
    }

    /// Renders Slack markup to an HTML fragment.
    #[must_use]
    pub fn render_text(&self, text: &str) -> String {
        render_blocks(&markup::transform(text, self.directory))
    }
}

/// Renders intermediate Markdown to an HTML fragment.
///
/// Empty or whitespace-only input yields an empty string.
#[must_use]
pub fn render_blocks(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let markdown = protect_inline_fences(&fence_shell_sessions(markdown));

    let mut rendered = String::new();
    html::push_html(&mut rendered, parse_events(&markdown).into_iter());

    let rendered = strip_single_paragraph(rendered.trim());
    let rendered = newlines_to_breaks(rendered);
    let rendered = expand_emoji(&rendered);
    style_code_spans(&rendered).trim().to_owned()
}

/// Parses Markdown into events, with two departures from CommonMark.
///
/// Raw HTML is passed through as text, and emphasis written with `_` or
/// `__` keeps its delimiters as literal text. Slack `_italic_` reaches this
/// point already rewritten to `*italic*`.
fn parse_events(markdown: &str) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    // The literal delimiter of each open emphasis, or `None` if it renders
    let mut open: Vec<Option<&'static str>> = Vec::new();

    for (event, range) in Parser::new_ext(markdown, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(tag @ (Tag::Emphasis | Tag::Strong)) => {
                let delimiter = markdown[range.start..].starts_with('_').then(|| {
                    if matches!(tag, Tag::Strong) { "__" } else { "_" }
                });
                open.push(delimiter);
                events.push(delimiter.map_or(Event::Start(tag), |d| Event::Text(d.into())));
            }
            Event::End(end @ (TagEnd::Emphasis | TagEnd::Strong)) => match open.pop().flatten() {
                Some(delimiter) => events.push(Event::Text(delimiter.into())),
                None => events.push(Event::End(end)),
            },
            Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
            other => events.push(other),
        }
    }
    events
}

/// Removes the `<p>` wrapper when the fragment is exactly one paragraph.
fn strip_single_paragraph(html: &str) -> &str {
    html.strip_prefix("<p>")
        .and_then(|inner| inner.strip_suffix("</p>"))
        .filter(|inner| !inner.contains("<p>"))
        .unwrap_or(html)
}

/// Converts newlines to `<br />`, dropping those that precede list markup.
fn newlines_to_breaks(html: &str) -> String {
    LIST_BREAK.replace_all(html, "$1").replace('\n', "<br />")
}

/// Replaces `:code:` with its emoji glyph when the code is known.
fn expand_emoji(html: &str) -> String {
    EMOJI_CODE
        .replace_all(html, |caps: &Captures<'_>| {
            emojis::get_by_shortcode(&caps[1])
                .map_or_else(|| caps[0].to_owned(), |emoji| emoji.as_str().to_owned())
        })
        .into_owned()
}

/// Wraps each triple-backtick span in a styled `<pre>`.
fn style_code_spans(html: &str) -> String {
    CODE_SPAN
        .replace_all(html, |caps: &Captures<'_>| {
            format!(r#"<pre style="{PRE_STYLE}">{}</pre>"#, &caps[1])
        })
        .into_owned()
}

/// Turns interactive shell sessions into fenced code.
///
/// A session starts at any line beginning with `>>> ` and runs to the next
/// blank line.
fn fence_shell_sessions(text: &str) -> Cow<'_, str> {
    if !text.lines().any(|line| line.starts_with(">>> ")) {
        return Cow::Borrowed(text);
    }

    let mut out = Vec::new();
    let mut in_session = false;
    for line in text.lines() {
        if in_session && line.trim().is_empty() {
            out.push("```");
            in_session = false;
        } else if !in_session && line.starts_with(">>> ") {
            out.push("```");
            in_session = true;
        }
        out.push(line);
    }
    if in_session {
        out.push("```");
    }
    Cow::Owned(out.join("\n"))
}

/// Returns `true` for a line that can open or close a fenced block:
/// three backticks, optionally followed by a one-word info string.
fn is_fence_line(line: &str) -> bool {
    line.trim()
        .strip_prefix("```")
        .is_some_and(|info| {
            info.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        })
}

/// Escapes triple backticks that do not form a fenced block.
///
/// Chat code is usually written inline (```like this```) or with text on
/// the fence lines. Those runs are kept literal through Markdown so that
/// [`style_code_spans`] can wrap them. A fence line with a matching bare
/// closing line later on is left for the Markdown parser.
fn protect_inline_fences(text: &str) -> String {
    if !text.contains("```") {
        return text.to_owned();
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if is_fence_line(lines[i])
            && let Some(offset) = lines[i + 1..].iter().position(|line| line.trim() == "```")
        {
            let end = i + 1 + offset;
            out.extend(lines[i..=end].iter().map(|line| Cow::Borrowed(*line)));
            i = end + 1;
            continue;
        }
        out.push(Cow::Owned(lines[i].replace("```", r"\`\`\`")));
        i += 1;
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> String {
        Renderer::new(&Directory::default()).render_text(text)
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render_blocks(""), "");
        assert_eq!(render_blocks("  \n "), "");
    }

    #[test]
    fn strips_single_paragraph_wrapper() {
        assert_eq!(render_blocks("hello"), "hello");
    }

    #[test]
    fn keeps_paragraphs_when_there_are_several() {
        assert_eq!(
            render_blocks("one\n\ntwo"),
            "<p>one</p><br /><p>two</p>"
        );
    }

    #[test]
    fn converts_soft_breaks() {
        assert_eq!(render_blocks("line one\nline two"), "line one<br />line two");
    }

    #[test]
    fn recognizes_cuddled_list() {
        let html = render_blocks("todo:\n- milk\n- eggs");

        assert!(html.starts_with("<p>todo:</p><ul><li>milk</li><li>eggs</li>"));
        assert!(!html.contains("<br /><ul>"));
        assert!(!html.contains("<br /><li>"));
    }

    #[test]
    fn renders_emphasis() {
        assert_eq!(render_blocks("**a** and *b*"), "<strong>a</strong> and <em>b</em>");
    }

    #[test]
    fn intraword_underscores_are_literal() {
        assert_eq!(render_blocks("snake_case_name"), "snake_case_name");
    }

    #[test]
    fn renders_links() {
        assert_eq!(
            render_blocks("[Example](https://example.com)"),
            r#"<a href="https://example.com">Example</a>"#
        );
    }

    #[test]
    fn escaped_hash_is_not_a_heading() {
        let html = render_blocks(r"\#general");
        assert_eq!(html, "#general");
        assert!(!html.contains("<h1>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_blocks("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn expands_emoji() {
        assert_eq!(render_blocks("hi :smile:"), "hi 😄");
        assert_eq!(render_blocks(":+1:"), "👍");
    }

    #[test]
    fn leaves_unknown_emoji_codes() {
        assert_eq!(render_blocks(":not_an_emoji_code:"), ":not_an_emoji_code:");
    }

    #[test]
    fn styles_inline_code_spans() {
        assert_eq!(
            render_blocks("run ```make test``` now"),
            format!(r#"run <pre style="{PRE_STYLE}">make test</pre> now"#)
        );
    }

    #[test]
    fn styles_multiline_chat_code() {
        assert_eq!(
            render_blocks("```let x = 1;\nlet y = 2;```"),
            format!(r#"<pre style="{PRE_STYLE}">let x = 1;<br />let y = 2;</pre>"#)
        );
    }

    #[test]
    fn renders_proper_fenced_block() {
        let html = render_blocks("```\nfn main() {}\n```");
        assert!(html.starts_with("<pre><code>fn main() {}"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn expands_emoji_inside_code_spans() {
        // Emoji expansion precedes code styling, so codes in chat code
        // blocks are expanded as well.
        assert_eq!(
            render_blocks("```:smile:```"),
            format!(r#"<pre style="{PRE_STYLE}">😄</pre>"#)
        );
    }

    #[test]
    fn fences_shell_sessions() {
        let html = render_blocks(">>> print(1)\n1");
        assert!(html.starts_with("<pre><code>&gt;&gt;&gt; print(1)<br />1"));
        assert!(!html.contains("<blockquote>"));
    }

    #[test]
    fn fence_line_detection() {
        assert!(is_fence_line("```"));
        assert!(is_fence_line("```rust"));
        assert!(!is_fence_line("```let x = 1;"));
        assert!(!is_fence_line("text ```"));
    }

    #[test]
    fn full_render_of_slack_text() {
        assert_eq!(
            render("see #general please"),
            "see <em>#general</em> please"
        );
        assert_eq!(render(" *bold* "), "<strong>bold</strong>");
        assert_eq!(render("a _em_ b"), "a <em>em</em> b");
    }

    #[test]
    fn emphasis_keeps_surrounding_spaces() {
        assert_eq!(render("x *bold* y"), "x <strong>bold</strong> y");
        assert_eq!(render("x _em_ y"), "x <em>em</em> y");
    }

    #[test]
    fn simple_smile_matches_slightly_smiling_face() {
        assert_eq!(render(":simple_smile:"), render(":slightly_smiling_face:"));
        assert_eq!(render(":slightly_smiling_face:"), "🙂");
    }

    #[test]
    fn underscore_emphasis_is_literal() {
        assert_eq!(render("edit __init__.py now"), "edit __init__.py now");
        assert_eq!(render("see (_note_) below"), "see (_note_) below");
        assert_eq!(render("(_:smile:_)"), "(_😄_)");
    }

    #[test]
    fn asterisk_emphasis_inside_underscores_still_renders() {
        assert_eq!(render_blocks("__a *b* c__"), "__a <em>b</em> c__");
    }

    #[test]
    fn fences_shell_session_after_text() {
        let html = render_blocks("text\n>>> print(1)\n1");
        assert!(html.starts_with("<p>text</p>"), "got {html}");
        assert!(html.contains("<pre><code>&gt;&gt;&gt; print(1)<br />1"));
        assert!(!html.contains("<blockquote>"));
    }

    #[test]
    fn shell_session_ends_at_blank_line() {
        let html = render_blocks(">>> x\n\nafter");
        assert!(html.contains("<pre><code>&gt;&gt;&gt; x"));
        assert!(html.ends_with("<p>after</p>"), "got {html}");
    }

    #[test]
    fn ordered_list_must_start_at_one_to_interrupt_text() {
        assert!(render_blocks("steps:\n1. a").contains("<ol>"));
        assert_eq!(render_blocks("steps:\n3. a"), "steps:<br />3. a");
    }
}
