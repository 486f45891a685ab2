// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Composition of a message body from its text and side content.
//!
//! A body is built as a list of HTML lines: the rendered message text,
//! then each attachment (separated by a blank line), then a file link or
//! file comment. [`Body::finish`] joins them with `<br />`.

use crate::parser::{Attachment, FileComment, SharedFile};
use crate::paths::file_save_path;
use crate::renderer::Renderer;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// The HTML lines of a message body under construction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Body {
    lines: Vec<String>,
}

impl Body {
    /// Creates an empty body.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Appends an already rendered HTML line.
    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// Appends each attachment's pretext, bold title and text.
    ///
    /// Every attachment is preceded by a blank line.
    pub fn append_attachments(&mut self, attachments: &[Attachment], renderer: &Renderer<'_>) {
        for att in attachments {
            self.lines.push(String::new());
            if let Some(pretext) = &att.pretext {
                self.lines.push(renderer.render_text(pretext.trim()));
            }
            if let Some(title) = &att.title {
                self.lines
                    .push(renderer.render_text(&format!("**{}**", title.trim())));
            }
            if let Some(text) = &att.text {
                self.lines.push(renderer.render_text(text.trim()));
            }
        }
    }

    /// Appends a download link for a shared file, and an inline image when
    /// the file is one.
    pub fn append_file_share(&mut self, file: &SharedFile, channel: &str) {
        let path = file_save_path(file, channel);
        let path = encode_double_quoted_attribute(&path);
        self.lines.push(format!(
            r#"<a href="{path}">Download File: {}</a>"#,
            encode_text(&file.name)
        ));
        if file.is_image() {
            self.lines.push(format!(r#"<img class="file" src="{path}">"#));
        }
    }

    /// Appends a file comment verbatim, without markup processing.
    pub fn append_file_comment(&mut self, comment: &FileComment) {
        self.lines.push(format!("<br /> {}", comment.comment));
    }

    /// Joins the lines with `<br />`, dropping a blank first line.
    #[must_use]
    pub fn finish(self) -> String {
        let mut lines = self.lines;
        if lines.first().is_some_and(|line| line.trim().is_empty()) {
            lines.remove(0);
        }
        lines.join("<br />").trim().to_owned()
    }
}
