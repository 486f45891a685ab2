// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Standalone HTML export of a channel.
//!
//! Each message becomes a row with the author's avatar, display name,
//! timestamp and rendered body. Rows are anchored by the message's
//! identity key so individual messages can be linked to.

use crate::message::Message;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 0 auto; max-width: 60em; }
.message { display: flex; gap: 0.75em; padding: 0.5em 0; }
.avatar { width: 36px; height: 36px; border-radius: 4px; }
.user { font-weight: bold; }
.time { color: #888; font-size: 0.85em; margin-left: 0.5em; text-decoration: none; }
img.file { display: block; max-width: 400px; }";

/// Shown in place of an author nothing identifies.
const UNKNOWN_AUTHOR: &str = "unknown";

/// Renders a channel's messages as a complete HTML document.
#[must_use]
pub fn render_channel_page(channel: &str, messages: &[Message<'_>]) -> String {
    let channel = encode_text(channel);
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>").unwrap();
    writeln!(out, r#"<html lang="en">"#).unwrap();
    writeln!(out, "<head>").unwrap();
    writeln!(out, r#"<meta charset="utf-8">"#).unwrap();
    writeln!(out, "<title>#{channel}</title>").unwrap();
    writeln!(out, "<style>\n{STYLE}\n</style>").unwrap();
    writeln!(out, "</head>").unwrap();
    writeln!(out, "<body>").unwrap();
    writeln!(out, "<h1>#{channel}</h1>").unwrap();

    for message in messages {
        render_row(&mut out, message);
    }

    writeln!(out, "</body>").unwrap();
    writeln!(out, "</html>").unwrap();

    tracing::debug!(channel = %channel, messages = messages.len(), "rendered channel page");
    out
}

fn render_row(out: &mut String, message: &Message<'_>) {
    let key = message.identity_key();
    let key_attr = encode_double_quoted_attribute(&key);
    let name = encode_text(message.display_name().unwrap_or(UNKNOWN_AUTHOR));

    writeln!(out, r#"<div class="message" id="{key_attr}">"#).unwrap();
    writeln!(
        out,
        r#"<img class="avatar" src="{}" alt="">"#,
        encode_double_quoted_attribute(&message.avatar_path())
    )
    .unwrap();
    writeln!(out, "<div>").unwrap();
    writeln!(
        out,
        r##"<span class="user">{name}</span><a class="time" href="#{key_attr}">{}</a>"##,
        encode_text(&key)
    )
    .unwrap();
    writeln!(out, r#"<div class="msg">{}</div>"#, message.body_html()).unwrap();
    writeln!(out, "</div>").unwrap();
    writeln!(out, "</div>").unwrap();
}
