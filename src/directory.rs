// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Read-only user and channel lookups.
//!
//! A [`Directory`] is built once per archive and shared by reference with
//! every render call. Nothing in the render path mutates it.
//!
//! Display names are resolved by walking a fixed list of strategies until
//! one produces a name; the result records which source won, or
//! [`DisplayName::Unresolved`] when none did.

use crate::parser::{ChannelTable, UserProfile, UserTable};

/// User and channel tables for one archive.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    /// Users keyed by id.
    pub users: UserTable,
    /// Channels keyed by id.
    pub channels: ChannelTable,
}

/// The identifiers a message offers for naming its author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameSources<'a> {
    /// The `user` field.
    pub user: Option<&'a str>,
    /// The `username` field.
    pub username: Option<&'a str>,
    /// The `bot_id` field.
    pub bot_id: Option<&'a str>,
}

impl<'a> NameSources<'a> {
    /// Sources for a bare user id, as found in a mention.
    #[must_use]
    pub const fn user(id: &'a str) -> Self {
        Self {
            user: Some(id),
            username: None,
            bot_id: None,
        }
    }
}

/// A resolved display name and the source it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayName<'a> {
    /// The user's name from the directory.
    Profile(&'a str),
    /// The message's own `username` field.
    Username(&'a str),
    /// The raw user id.
    UserId(&'a str),
    /// The raw bot id.
    BotId(&'a str),
    /// No source produced a name.
    Unresolved,
}

impl<'a> DisplayName<'a> {
    /// Returns the name, or `None` if unresolved.
    #[must_use]
    pub const fn as_str(self) -> Option<&'a str> {
        match self {
            Self::Profile(name) | Self::Username(name) | Self::UserId(name) | Self::BotId(name) => {
                Some(name)
            }
            Self::Unresolved => None,
        }
    }
}

type Strategy = for<'a> fn(&'a Directory, NameSources<'a>) -> Option<DisplayName<'a>>;

/// Resolution order: directory name, `username`, user id, bot id.
const STRATEGIES: [Strategy; 4] = [from_profile, from_username, from_user_id, from_bot_id];

fn from_profile<'a>(directory: &'a Directory, sources: NameSources<'a>) -> Option<DisplayName<'a>> {
    let name = directory.user(sources.user?)?.name.as_deref()?;
    Some(DisplayName::Profile(name))
}

fn from_username<'a>(_: &'a Directory, sources: NameSources<'a>) -> Option<DisplayName<'a>> {
    sources.username.map(DisplayName::Username)
}

fn from_user_id<'a>(_: &'a Directory, sources: NameSources<'a>) -> Option<DisplayName<'a>> {
    sources.user.map(DisplayName::UserId)
}

fn from_bot_id<'a>(_: &'a Directory, sources: NameSources<'a>) -> Option<DisplayName<'a>> {
    sources.bot_id.map(DisplayName::BotId)
}

impl Directory {
    /// Creates a directory from loaded tables.
    #[must_use]
    pub const fn new(users: UserTable, channels: ChannelTable) -> Self {
        Self { users, channels }
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<&UserProfile> {
        self.users.get(id)
    }

    /// Looks up a channel's display name by id.
    #[must_use]
    pub fn channel_name(&self, id: &str) -> Option<&str> {
        self.channels.get(id).map(|channel| channel.name.as_str())
    }

    /// Resolves a display name from the given sources.
    #[must_use]
    pub fn resolve_name<'a>(&'a self, sources: NameSources<'a>) -> DisplayName<'a> {
        STRATEGIES
            .iter()
            .find_map(|strategy| strategy(self, sources))
            .unwrap_or(DisplayName::Unresolved)
    }
}
