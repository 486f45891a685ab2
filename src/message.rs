// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Display-ready view of a single message.
//!
//! [`Message`] pairs a validated [`RawMessage`] with the archive's
//! [`Directory`] and the name of the channel it was posted in. Every
//! property is derived on access; nothing is cached.
//!
//! # Example
//!
//! ```
//! use slack_export_viewer::directory::Directory;
//! use slack_export_viewer::message::Message;
//! use slack_export_viewer::parser::parse_message;
//!
//! let raw = parse_message(r#"{
//!     "username": "deploybot",
//!     "text": "Released *v1.2*",
//!     "ts": "1456427378.000002"
//! }"#).unwrap();
//!
//! let dir = Directory::default();
//! let message = Message::new(&raw, &dir, "general");
//!
//! assert_eq!(message.display_name(), Some("deploybot"));
//! assert_eq!(message.body_html(), "Released <strong>v1.2</strong>");
//! ```

use crate::attachments::Body;
use crate::directory::{Directory, DisplayName, NameSources};
use crate::parser::{MessageKind, RawMessage};
use crate::paths::{MESSAGE_AVATAR_SIZE, PLACEHOLDER_AVATAR, avatar_path};
use crate::renderer::Renderer;

/// A message bound to the lookups needed to display it.
#[derive(Debug, Clone, Copy)]
pub struct Message<'a> {
    raw: &'a RawMessage,
    directory: &'a Directory,
    channel_name: &'a str,
}

impl<'a> Message<'a> {
    /// Binds a message to its directory and channel.
    #[must_use]
    pub const fn new(raw: &'a RawMessage, directory: &'a Directory, channel_name: &'a str) -> Self {
        Self {
            raw,
            directory,
            channel_name,
        }
    }

    /// Returns the posting user's id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&'a str> {
        self.raw.user.as_deref()
    }

    /// Resolves the author's display name and where it came from.
    #[must_use]
    pub fn resolved_name(&self) -> DisplayName<'a> {
        self.directory.resolve_name(NameSources {
            user: self.raw.user.as_deref(),
            username: self.raw.username.as_deref(),
            bot_id: self.raw.bot_id.as_deref(),
        })
    }

    /// Returns the author's display name, or `None` if nothing identifies
    /// the author.
    #[must_use]
    pub fn display_name(&self) -> Option<&'a str> {
        self.resolved_name().as_str()
    }

    /// Returns the posting time as a local `YYYY-MM-DD HH:MM:SS` string.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.raw.ts.format_local()
    }

    /// Returns the key identifying this message within a page.
    ///
    /// This is the formatted timestamp, so two messages posted in the same
    /// second share a key.
    #[must_use]
    pub fn identity_key(&self) -> String {
        self.timestamp()
    }

    /// Returns the local path of the author's 72px avatar, or a placeholder
    /// when the author has no directory entry or no avatar.
    #[must_use]
    pub fn avatar_path(&self) -> String {
        self.user_id()
            .and_then(|id| self.directory.user(id))
            .and_then(|user| avatar_path(user, MESSAGE_AVATAR_SIZE))
            .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_owned())
    }

    /// Renders the message body: text, then attachments, then any shared
    /// file or file comment.
    #[must_use]
    pub fn body_html(&self) -> String {
        let renderer = Renderer::new(self.directory);
        let mut body = Body::new();

        if let Some(text) = self.raw.text.as_deref().filter(|text| !text.is_empty()) {
            body.push(renderer.render_text(text));
        }

        body.append_attachments(&self.raw.attachments, &renderer);

        match &self.raw.kind {
            MessageKind::Plain => {}
            MessageKind::FileShare(file) => body.append_file_share(file, self.channel_name),
            MessageKind::FileComment(comment) => body.append_file_comment(comment),
        }

        body.finish()
    }
}
