// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Render Slack export archives as HTML.
//!
//! This crate turns the messages of an extracted Slack export into
//! display-ready HTML fragments and static channel pages.
//!
//! # Overview
//!
//! Message text passes through a fixed pipeline:
//!
//! 1. [`markup`] rewrites Slack's dialect (mentions, channel references,
//!    links, `*bold*`, `_italic_`) into Markdown
//! 2. [`renderer`] converts that Markdown to HTML and expands emoji
//! 3. [`attachments`] appends attachments, shared files and file comments
//!
//! [`message::Message`] ties a record to the archive's [`directory`] and
//! exposes the derived fields a message row needs.
//!
//! # Example
//!
//! ```no_run
//! use slack_export_viewer::{archive::Archive, message::Message, page};
//!
//! let archive = Archive::open("export").unwrap();
//! let raw = archive.channel_messages("general").unwrap();
//! let messages: Vec<_> = raw
//!     .iter()
//!     .map(|m| Message::new(m, archive.directory(), "general"))
//!     .collect();
//!
//! let html = page::render_channel_page("general", &messages);
//! println!("{html}");
//! ```
//!
//! # Modules
//!
//! - [`parser`]: JSON parsing and validation of archive records
//! - [`directory`]: user/channel lookups and display-name resolution
//! - [`markup`]: Slack markup to intermediate Markdown
//! - [`renderer`]: Markdown to HTML with chat-specific passes
//! - [`attachments`]: message body composition
//! - [`message`]: the display-ready message view
//! - [`paths`]: local path conventions for avatars and files
//! - [`archive`]: reading an extracted export directory
//! - [`page`]: standalone channel pages
//! - [`manifest`]: download plans for avatars and shared files

#![deny(missing_docs)]

pub mod archive;
pub mod attachments;
pub mod directory;
pub mod manifest;
pub mod markup;
pub mod message;
pub mod page;
pub mod parser;
pub mod paths;
pub mod renderer;
