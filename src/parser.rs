// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON parsing for Slack export archives.
//!
//! An extracted export contains three kinds of JSON document that matter for
//! rendering:
//!
//! - `users.json`: the user directory (ids, names, avatar URLs)
//! - `channels.json`: the channel directory (ids and names)
//! - `<channel>/<date>.json`: one day of messages for a channel
//!
//! Message records are loosely typed in the export. This module validates
//! them once, at construction, into a [`RawMessage`] whose subtype-specific
//! data lives in the [`MessageKind`] tagged union. A message without a
//! usable `ts` is rejected; everything else degrades to defaults.
//!
//! # Example
//!
//! ```
//! use slack_export_viewer::parser::{parse_message, MessageKind};
//!
//! let json = r#"{
//!     "type": "message",
//!     "user": "U023BECGF",
//!     "text": "Hello <@U061F7AUR>",
//!     "ts": "1456427378.000002"
//! }"#;
//!
//! let message = parse_message(json).unwrap();
//! assert_eq!(message.user.as_deref(), Some("U023BECGF"));
//! assert!(matches!(message.kind, MessageKind::Plain));
//! ```

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// User directory keyed by user id.
pub type UserTable = HashMap<String, UserProfile>;

/// Channel directory keyed by channel id.
pub type ChannelTable = HashMap<String, Channel>;

/// Error type for archive parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },

    /// A day log was not a JSON array of messages.
    #[snafu(display("message log is not a JSON array"))]
    NotALog,

    /// The message has no `ts` field.
    #[snafu(display("message has no `ts` field"))]
    MissingTimestamp,

    /// The `ts` field is not a POSIX timestamp.
    #[snafu(display("invalid message timestamp {ts:?}"))]
    InvalidTimestamp {
        /// The rejected timestamp text.
        ts: String,
    },

    /// A subtype-specific record is absent.
    #[snafu(display("`{subtype}` message has no `{field}` record"))]
    MissingField {
        /// The message subtype that requires the record.
        subtype: &'static str,
        /// The missing field name.
        field: &'static str,
    },

    /// A subtype-specific record is present but malformed.
    #[snafu(display("malformed `{field}` record: {source}"))]
    InvalidField {
        /// The malformed field name.
        field: &'static str,
        /// The underlying decoding error.
        source: serde_json::Error,
    },
}

/// A user from the export's user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// The user id (e.g., "U023BECGF").
    pub id: String,

    /// The user's handle, if the directory carries one.
    pub name: Option<String>,

    /// Avatar URLs keyed by pixel size ("24", "32", "48", "72", "192", "512").
    ///
    /// Sizes whose URL is absent from the profile are not present here.
    pub avatars: BTreeMap<String, String>,
}

impl UserProfile {
    /// Returns the avatar URL for the given pixel size, if non-empty.
    #[must_use]
    pub fn avatar_url(&self, size: &str) -> Option<&str> {
        self.avatars
            .get(size)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Builds a profile from a directory record.
    ///
    /// The id comes from the record itself, or from the enclosing key when
    /// the directory is an object keyed by id.
    fn from_record(key: Option<&str>, record: &Value) -> Option<Self> {
        let id = get_str(record, &["id"]).or(key)?.to_owned();

        let avatars = record
            .get("profile")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .filter_map(|(field, url)| {
                let size = field.strip_prefix("image_")?;
                if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Some((size.to_owned(), url.as_str()?.to_owned()))
            })
            .collect();

        Some(Self {
            id,
            name: get_string(record, &["name"]),
            avatars,
        })
    }
}

/// A channel from the export's channel directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// The channel id (e.g., "C024BE91L").
    pub id: String,

    /// The channel's display name, without the leading `#`.
    pub name: String,
}

impl Channel {
    fn from_record(key: Option<&str>, record: &Value) -> Option<Self> {
        let id = get_str(record, &["id"]).or(key)?.to_owned();
        let name = get_string(record, &["name"]).unwrap_or_else(|| id.clone());
        Some(Self { id, name })
    }
}

/// A message timestamp truncated to whole seconds.
///
/// Slack encodes `ts` as decimal seconds with a microsecond fraction
/// (`"1456427378.000002"`). Only the integer part is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parses a `ts` string, discarding the fractional part.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidTimestamp`] if the integer part is not a
    /// number or is outside the representable date range.
    pub fn parse(ts: &str) -> Result<Self, ParseError> {
        let seconds = ts.trim().split('.').next().unwrap_or_default();
        seconds
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Self)
            .context(InvalidTimestampSnafu { ts })
    }

    /// Returns the POSIX time in whole seconds.
    #[must_use]
    pub fn seconds(self) -> i64 {
        self.0.timestamp()
    }

    /// Formats the timestamp in the local time zone as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn format_local(self) -> String {
        self.0
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// A structured side panel attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    /// Text shown above the attachment.
    pub pretext: Option<String>,
    /// The attachment's title.
    pub title: Option<String>,
    /// The attachment's body text.
    pub text: Option<String>,
}

/// An uploaded file referenced by a `file_share` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SharedFile {
    /// The file id (e.g., "F0BNRE9PY").
    pub id: String,

    /// The original file name, possibly without an extension.
    pub name: String,

    /// MIME type (e.g., "image/png").
    #[serde(default)]
    pub mimetype: String,

    /// Slack's short type name (e.g., "pdf"), used when the name has no extension.
    #[serde(default)]
    pub filetype: String,

    /// URL of the file's page; the link target for externally hosted files.
    #[serde(default)]
    pub url_private: String,

    /// Direct download URL for files hosted by Slack.
    #[serde(default)]
    pub url_private_download: Option<String>,

    /// Whether the file lives on an external service (Google Drive, etc.).
    #[serde(default)]
    pub is_external: bool,
}

impl SharedFile {
    /// Returns `true` if the MIME type's primary component is `image`.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mimetype.split('/').next() == Some("image")
    }
}

/// The comment carried by a `file_comment` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileComment {
    /// The comment text, passed through without markup processing.
    pub comment: String,
}

/// Subtype-specific message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// An ordinary message, including subtypes with no extra rendering
    /// (joins, bot messages, topic changes).
    Plain,
    /// A message sharing an uploaded file.
    FileShare(SharedFile),
    /// A comment on a previously shared file.
    FileComment(FileComment),
}

/// One message record from a channel's day log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Id of the posting user.
    pub user: Option<String>,
    /// Fallback display name, set on bot and integration messages.
    pub username: Option<String>,
    /// Id of the posting bot.
    pub bot_id: Option<String>,
    /// When the message was posted.
    pub ts: Timestamp,
    /// The message body in Slack markup.
    pub text: Option<String>,
    /// Attachments in arrival order.
    pub attachments: Vec<Attachment>,
    /// Subtype-specific content.
    pub kind: MessageKind,
}

impl RawMessage {
    /// Validates a decoded JSON record into a message.
    ///
    /// # Errors
    ///
    /// Returns an error if `ts` is missing or invalid, or if a `file_share`
    /// or `file_comment` message lacks a well-formed `file` or `comment`
    /// record.
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        let ts = match value.get("ts") {
            Some(Value::String(ts)) => Timestamp::parse(ts)?,
            Some(Value::Number(ts)) => Timestamp::parse(&ts.to_string())?,
            _ => return MissingTimestampSnafu.fail(),
        };

        let kind = match get_str(value, &["subtype"]) {
            Some("file_share") => {
                MessageKind::FileShare(extract_record(value, "file_share", "file")?)
            }
            Some("file_comment") => {
                MessageKind::FileComment(extract_record(value, "file_comment", "comment")?)
            }
            _ => MessageKind::Plain,
        };

        Ok(Self {
            user: get_string(value, &["user"]),
            username: get_string(value, &["username"]),
            bot_id: get_string(value, &["bot_id"]),
            ts,
            text: get_string(value, &["text"]),
            attachments: extract_attachments(value),
            kind,
        })
    }
}

/// A message that failed validation inside a day log.
#[derive(Debug)]
pub struct RejectedMessage {
    /// Position of the record within the log.
    pub index: usize,
    /// Why the record was rejected.
    pub error: ParseError,
}

/// The parsed contents of one day log.
#[derive(Debug, Default)]
pub struct MessageLog {
    /// Messages that validated, in log order.
    pub messages: Vec<RawMessage>,
    /// Records that failed validation.
    pub rejected: Vec<RejectedMessage>,
}

/// Decodes a subtype-specific record stored under `field`.
fn extract_record<T: DeserializeOwned>(
    value: &Value,
    subtype: &'static str,
    field: &'static str,
) -> Result<T, ParseError> {
    let record = value
        .get(field)
        .filter(|record| !record.is_null())
        .context(MissingFieldSnafu { subtype, field })?;
    T::deserialize(record).context(InvalidFieldSnafu { field })
}

/// Extracts attachments, keeping only their string fields.
///
/// A `null` or non-array `attachments` field yields no attachments.
fn extract_attachments(value: &Value) -> Vec<Attachment> {
    value
        .get("attachments")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|att| att.is_object())
        .map(|att| Attachment {
            pretext: get_string(att, &["pretext"]),
            title: get_string(att, &["title"]),
            text: get_string(att, &["text"]),
        })
        .collect()
}

/// Iterates directory records, which may be an array of records or an
/// object keyed by id.
fn directory_records(value: &Value) -> Vec<(Option<&str>, &Value)> {
    match value {
        Value::Array(items) => items.iter().map(|item| (None, item)).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
        _ => Vec::new(),
    }
}

/// Navigates a JSON path and returns the string value at the end.
///
/// # Arguments
///
/// * `value` - The root JSON value to navigate from
/// * `path` - A sequence of keys to follow through the JSON structure
fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str()
}

/// Like [`get_str`] but returns an owned `String`.
fn get_string(value: &Value, path: &[&str]) -> Option<String> {
    get_str(value, path).map(str::to_owned)
}

/// Parses a single message record.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or the record fails validation
/// (see [`RawMessage::from_value`]).
pub fn parse_message(json_str: &str) -> Result<RawMessage, ParseError> {
    let value: Value = serde_json::from_str(json_str).context(JsonSnafu)?;
    RawMessage::from_value(&value)
}

/// Parses one day log (`<channel>/<date>.json`).
///
/// Records that fail validation are collected in [`MessageLog::rejected`]
/// rather than failing the whole log.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or is not an array.
///
/// # Example
///
/// ```
/// use slack_export_viewer::parser::parse_message_log;
///
/// let json = r#"[
///     { "user": "U1", "text": "first", "ts": "1456427378.000002" },
///     { "user": "U1", "text": "no timestamp" }
/// ]"#;
///
/// let log = parse_message_log(json).unwrap();
/// assert_eq!(log.messages.len(), 1);
/// assert_eq!(log.rejected[0].index, 1);
/// ```
pub fn parse_message_log(json_str: &str) -> Result<MessageLog, ParseError> {
    let value: Value = serde_json::from_str(json_str).context(JsonSnafu)?;
    let records = value.as_array().context(NotALogSnafu)?;

    let mut log = MessageLog::default();
    for (index, record) in records.iter().enumerate() {
        match RawMessage::from_value(record) {
            Ok(message) => log.messages.push(message),
            Err(error) => log.rejected.push(RejectedMessage { index, error }),
        }
    }
    Ok(log)
}

/// Parses the user directory (`users.json`).
///
/// Accepts either the export's array of user records or an object keyed by
/// user id. Records without an id are skipped.
///
/// # Errors
///
/// Returns an error if the JSON is malformed.
pub fn parse_users(json_str: &str) -> Result<UserTable, ParseError> {
    let value: Value = serde_json::from_str(json_str).context(JsonSnafu)?;
    Ok(directory_records(&value)
        .into_iter()
        .filter_map(|(key, record)| UserProfile::from_record(key, record))
        .map(|user| (user.id.clone(), user))
        .collect())
}

/// Parses the channel directory (`channels.json`).
///
/// Accepts the same shapes as [`parse_users`].
///
/// # Errors
///
/// Returns an error if the JSON is malformed.
pub fn parse_channels(json_str: &str) -> Result<ChannelTable, ParseError> {
    let value: Value = serde_json::from_str(json_str).context(JsonSnafu)?;
    Ok(directory_records(&value)
        .into_iter()
        .filter_map(|(key, record)| Channel::from_record(key, record))
        .map(|channel| (channel.id.clone(), channel))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_json(extra: &str) -> String {
        format!(
            r#"{{
                "type": "message",
                "ts": "1456427378.000002"{extra}
            }}"#
        )
    }

    #[test]
    fn parses_plain_message() {
        let json = message_json(r#", "user": "U023BECGF", "text": "Hello""#);
        let message = parse_message(&json).unwrap();

        assert_eq!(message.user.as_deref(), Some("U023BECGF"));
        assert_eq!(message.text.as_deref(), Some("Hello"));
        assert_eq!(message.ts.seconds(), 1_456_427_378);
        assert!(message.attachments.is_empty());
        assert!(matches!(message.kind, MessageKind::Plain));
    }

    #[test]
    fn parses_bot_message_fields() {
        let json = message_json(
            r#", "subtype": "bot_message", "username": "deploybot", "bot_id": "B0123""#,
        );
        let message = parse_message(&json).unwrap();

        assert!(message.user.is_none());
        assert_eq!(message.username.as_deref(), Some("deploybot"));
        assert_eq!(message.bot_id.as_deref(), Some("B0123"));
        assert!(matches!(message.kind, MessageKind::Plain));
    }

    #[test]
    fn truncates_timestamp_fraction() {
        let early = Timestamp::parse("1456427378.000002").unwrap();
        let late = Timestamp::parse("1456427378.999999").unwrap();

        assert_eq!(early, late);
        assert_eq!(early.format_local(), late.format_local());
    }

    #[test]
    fn accepts_timestamp_without_fraction() {
        assert_eq!(Timestamp::parse("1456427378").unwrap().seconds(), 1_456_427_378);
    }

    #[test]
    fn accepts_numeric_timestamp() {
        let message = parse_message(r#"{"ts": 1456427378.5}"#).unwrap();
        assert_eq!(message.ts.seconds(), 1_456_427_378);
    }

    #[test]
    fn formats_timestamp_with_second_precision() {
        let formatted = Timestamp::parse("1456427378.000002").unwrap().format_local();

        // YYYY-MM-DD HH:MM:SS, whatever the local zone
        assert_eq!(formatted.len(), 19);
        assert_eq!(&formatted[4..5], "-");
        assert_eq!(&formatted[10..11], " ");
        assert_eq!(&formatted[13..14], ":");
    }

    #[test]
    fn rejects_missing_timestamp() {
        let result = parse_message(r#"{"user": "U1", "text": "Hi"}"#);
        assert!(matches!(result, Err(ParseError::MissingTimestamp)));
    }

    #[test]
    fn rejects_garbage_timestamp() {
        let result = parse_message(r#"{"ts": "yesterday"}"#);
        match result {
            Err(ParseError::InvalidTimestamp { ts }) => assert_eq!(ts, "yesterday"),
            other => panic!("Expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn parses_attachments_in_order() {
        let json = message_json(
            r#", "attachments": [
                {"pretext": "Build finished", "title": "Job 12", "text": "All green"},
                {"title": "Second", "color": "36a64f"}
            ]"#,
        );
        let message = parse_message(&json).unwrap();

        assert_eq!(message.attachments.len(), 2);
        assert_eq!(message.attachments[0].pretext.as_deref(), Some("Build finished"));
        assert_eq!(message.attachments[0].title.as_deref(), Some("Job 12"));
        assert_eq!(message.attachments[0].text.as_deref(), Some("All green"));
        assert_eq!(message.attachments[1].title.as_deref(), Some("Second"));
        assert!(message.attachments[1].text.is_none());
    }

    #[test]
    fn treats_null_attachments_as_empty() {
        let json = message_json(r#", "attachments": null"#);
        let message = parse_message(&json).unwrap();

        assert!(message.attachments.is_empty());
    }

    #[test]
    fn parses_file_share() {
        let json = message_json(
            r#", "subtype": "file_share", "file": {
                "id": "F0BNRE9PY",
                "name": "diagram.png",
                "mimetype": "image/png",
                "filetype": "png",
                "url_private": "https://files.slack.com/files-pri/T1-F0BNRE9PY/diagram.png",
                "url_private_download": "https://files.slack.com/files-pri/T1-F0BNRE9PY/download/diagram.png",
                "is_external": false
            }"#,
        );
        let message = parse_message(&json).unwrap();

        match &message.kind {
            MessageKind::FileShare(file) => {
                assert_eq!(file.id, "F0BNRE9PY");
                assert_eq!(file.name, "diagram.png");
                assert!(file.is_image());
                assert!(!file.is_external);
                assert!(file.url_private_download.is_some());
            }
            other => panic!("Expected FileShare, got {other:?}"),
        }
    }

    #[test]
    fn rejects_file_share_without_file() {
        let json = message_json(r#", "subtype": "file_share""#);
        let result = parse_message(&json);

        assert!(matches!(
            result,
            Err(ParseError::MissingField {
                subtype: "file_share",
                field: "file"
            })
        ));
    }

    #[test]
    fn rejects_malformed_file_record() {
        let json = message_json(r#", "subtype": "file_share", "file": {"name": "x.txt"}"#);
        let result = parse_message(&json);

        assert!(matches!(
            result,
            Err(ParseError::InvalidField { field: "file", .. })
        ));
    }

    #[test]
    fn parses_file_comment() {
        let json = message_json(
            r#", "subtype": "file_comment", "comment": {"id": "Fc1", "comment": "Looks good"}"#,
        );
        let message = parse_message(&json).unwrap();

        match &message.kind {
            MessageKind::FileComment(comment) => assert_eq!(comment.comment, "Looks good"),
            other => panic!("Expected FileComment, got {other:?}"),
        }
    }

    #[test]
    fn detects_non_image_mimetype() {
        let file = SharedFile {
            id: "F1".into(),
            name: "report.pdf".into(),
            mimetype: "application/pdf".into(),
            filetype: "pdf".into(),
            url_private: String::new(),
            url_private_download: None,
            is_external: false,
        };
        assert!(!file.is_image());
    }

    #[test]
    fn collects_rejected_messages_in_log() {
        let json = r#"[
            {"ts": "1456427378.000002", "text": "ok"},
            {"text": "missing ts"},
            {"ts": "1456427379.000002", "subtype": "file_comment"}
        ]"#;
        let log = parse_message_log(json).unwrap();

        assert_eq!(log.messages.len(), 1);
        assert_eq!(log.rejected.len(), 2);
        assert_eq!(log.rejected[0].index, 1);
        assert_eq!(log.rejected[1].index, 2);
    }

    #[test]
    fn rejects_log_that_is_not_an_array() {
        assert!(matches!(
            parse_message_log(r#"{"ts": "1"}"#),
            Err(ParseError::NotALog)
        ));
    }

    #[test]
    fn parses_user_directory_array() {
        let json = r#"[{
            "id": "U023BECGF",
            "name": "bobby",
            "profile": {
                "real_name": "Bobby Tables",
                "image_24": "https://avatars.example/bobby_24.jpg",
                "image_72": "https://avatars.example/bobby_72.jpg",
                "image_original": "https://avatars.example/bobby.jpg"
            }
        }]"#;
        let users = parse_users(json).unwrap();
        let bobby = &users["U023BECGF"];

        assert_eq!(bobby.name.as_deref(), Some("bobby"));
        assert_eq!(bobby.avatars.len(), 2);
        assert_eq!(
            bobby.avatar_url("72"),
            Some("https://avatars.example/bobby_72.jpg")
        );
        assert!(bobby.avatar_url("512").is_none());
    }

    #[test]
    fn parses_user_directory_keyed_by_id() {
        let json = r#"{"U1": {"name": "alice", "profile": {"image_72": ""}}}"#;
        let users = parse_users(json).unwrap();

        assert_eq!(users["U1"].id, "U1");
        assert!(users["U1"].avatar_url("72").is_none());
    }

    #[test]
    fn parses_channel_directory() {
        let json = r#"[
            {"id": "C024BE91L", "name": "general"},
            {"id": "C0NONAME"},
            {"name": "no-id"}
        ]"#;
        let channels = parse_channels(json).unwrap();

        assert_eq!(channels.len(), 2);
        assert_eq!(channels["C024BE91L"].name, "general");
        assert_eq!(channels["C0NONAME"].name, "C0NONAME");
    }

    #[test]
    fn returns_error_for_invalid_json() {
        assert!(parse_message("not valid json").is_err());
        assert!(parse_users("not valid json").is_err());
    }
}
