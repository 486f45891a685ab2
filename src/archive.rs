// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Reading an extracted Slack export from disk.
//!
//! The export layout is:
//!
//! ```text
//! users.json
//! channels.json
//! general/2016-02-25.json
//! general/2016-02-26.json
//! random/2016-02-25.json
//! ```
//!
//! Day logs are read in file-name order, which is chronological.

use crate::directory::Directory;
use crate::parser::{self, ParseError, RawMessage};
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Error type for archive reading failures.
#[derive(Debug, Snafu)]
pub enum ArchiveError {
    /// A file could not be read.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A file could not be parsed.
    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        /// The file that failed.
        path: PathBuf,
        /// The underlying parse error.
        source: ParseError,
    },

    /// The requested channel has no directory in the archive.
    #[snafu(display("channel {name:?} not found in {}", root.display()))]
    UnknownChannel {
        /// The channel name.
        name: String,
        /// The archive root.
        root: PathBuf,
    },
}

/// An extracted export directory with its lookups loaded.
#[derive(Debug)]
pub struct Archive {
    root: PathBuf,
    directory: Directory,
}

impl Archive {
    /// Opens an export directory, loading `users.json` and `channels.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory file is missing or malformed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let root = root.into();
        let users = read_with(&root.join("users.json"), parser::parse_users)?;
        let channels = read_with(&root.join("channels.json"), parser::parse_channels)?;
        tracing::debug!(
            root = %root.display(),
            users = users.len(),
            channels = channels.len(),
            "loaded archive directory"
        );
        Ok(Self {
            root,
            directory: Directory::new(users, channels),
        })
    }

    /// Returns the archive's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the user and channel lookups.
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Returns the names of all channels in the directory, sorted.
    #[must_use]
    pub fn channel_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .directory
            .channels
            .values()
            .map(|channel| channel.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Reads every day log for a channel, in chronological order.
    ///
    /// Messages that fail validation are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel has no directory, or a day log is
    /// unreadable or not a JSON array.
    pub fn channel_messages(&self, name: &str) -> Result<Vec<RawMessage>, ArchiveError> {
        let dir = self.root.join(name);
        ensure!(
            dir.is_dir(),
            UnknownChannelSnafu {
                name,
                root: &self.root
            }
        );

        let mut messages = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        {
            let path = entry.path();
            let log = read_with(path, parser::parse_message_log)?;
            for rejected in &log.rejected {
                tracing::warn!(
                    file = %path.display(),
                    index = rejected.index,
                    error = %rejected.error,
                    "skipping invalid message"
                );
            }
            messages.extend(log.messages);
        }
        Ok(messages)
    }
}

/// Reads a file and parses it with `parse`.
fn read_with<T>(
    path: &Path,
    parse: impl FnOnce(&str) -> Result<T, ParseError>,
) -> Result<T, ArchiveError> {
    let json = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
    parse(&json).context(ParseFileSnafu { path })
}
