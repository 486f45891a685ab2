// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Download plans for avatars and shared files.
//!
//! Rendering never touches the network. Pages link to local paths, and this
//! module lists which remote URL belongs at each path so an external
//! downloader can fetch them.

use crate::directory::Directory;
use crate::parser::{MessageKind, RawMessage};
use crate::paths::{AVATAR_SIZES, avatar_path, file_save_path};
use std::fmt;

/// One file to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Where to fetch from.
    pub url: String,
    /// Where to save, relative to the output directory.
    pub path: String,
}

impl fmt::Display for Download {
    /// Formats as a tab-separated `url<TAB>path` line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.url, self.path)
    }
}

/// Lists every avatar, at every size, for users that have one.
///
/// Users are ordered by id.
#[must_use]
pub fn avatar_downloads(directory: &Directory) -> Vec<Download> {
    let mut users: Vec<_> = directory.users.values().collect();
    users.sort_unstable_by(|a, b| a.id.cmp(&b.id));

    users
        .into_iter()
        .flat_map(|user| {
            AVATAR_SIZES.iter().filter_map(move |size| {
                Some(Download {
                    url: user.avatar_url(size)?.to_owned(),
                    path: avatar_path(user, size)?,
                })
            })
        })
        .collect()
}

/// Lists the Slack-hosted files shared in a channel.
///
/// Externally hosted files are linked directly and need no download.
#[must_use]
pub fn file_downloads(messages: &[RawMessage], channel: &str) -> Vec<Download> {
    messages
        .iter()
        .filter_map(|message| match &message.kind {
            MessageKind::FileShare(file) if !file.is_external => Some(Download {
                url: file
                    .url_private_download
                    .clone()
                    .unwrap_or_else(|| file.url_private.clone()),
                path: file_save_path(file, channel),
            }),
            _ => None,
        })
        .collect()
}
