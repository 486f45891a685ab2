// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Local path conventions for downloaded avatars and files.
//!
//! Rendered pages reference avatars and shared files by local path. The
//! files themselves are fetched by an external downloader, which must save
//! them where these functions say:
//!
//! - `avatars/{size}/{user_id}_{size}{ext}`
//! - `files/{channel}/{file_id}{ext}`

use crate::parser::{SharedFile, UserProfile};
use std::path::Path;

/// Avatar sizes present in a Slack user profile, in pixels.
pub const AVATAR_SIZES: [&str; 6] = ["24", "32", "48", "72", "192", "512"];

/// The avatar size shown next to messages.
pub const MESSAGE_AVATAR_SIZE: &str = "72";

/// Shown for authors with no directory entry or no avatar URL.
pub const PLACEHOLDER_AVATAR: &str = "avatars/72/U11656PFZ_72.png";

/// The extension Slack writes when it does not know the real one.
const NULL_EXTENSION: &str = "(null)";

/// Returns the local path of a user's avatar at the given size.
///
/// Returns `None` if the profile has no URL for that size.
#[must_use]
pub fn avatar_path(user: &UserProfile, size: &str) -> Option<String> {
    let url = user.avatar_url(size)?;
    Some(format!(
        "avatars/{size}/{}_{size}{}",
        user.id,
        url_extension(url)
    ))
}

/// Returns where a shared file is saved, or its URL if externally hosted.
///
/// The extension comes from the file name; when the name has none (or
/// Slack's `(null)` placeholder), it comes from `filetype`.
#[must_use]
pub fn file_save_path(file: &SharedFile, channel: &str) -> String {
    if file.is_external {
        return file.url_private.clone();
    }

    let extension = Path::new(&file.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && *ext != NULL_EXTENSION);

    match extension {
        Some(ext) => format!("files/{channel}/{}.{ext}", file.id),
        None if file.filetype.is_empty() => format!("files/{channel}/{}", file.id),
        None => format!("files/{channel}/{}.{}", file.id, file.filetype),
    }
}

/// Returns the extension (with leading dot) of a URL's last path segment.
///
/// Query strings and fragments are ignored. Returns an empty string when
/// the segment has no extension.
#[must_use]
pub fn url_extension(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    match segment.rfind('.') {
        Some(dot) if dot > 0 => &segment[dot..],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn shared_file(name: &str, filetype: &str) -> SharedFile {
        SharedFile {
            id: "F0BNRE9PY".into(),
            name: name.into(),
            mimetype: "application/pdf".into(),
            filetype: filetype.into(),
            url_private: "https://files.slack.com/files-pri/T1-F0BNRE9PY/report".into(),
            url_private_download: None,
            is_external: false,
        }
    }

    #[test]
    fn file_without_extension_uses_filetype() {
        assert_eq!(
            file_save_path(&shared_file("report", "pdf"), "general"),
            "files/general/F0BNRE9PY.pdf"
        );
    }

    #[test]
    fn file_extension_keeps_case() {
        assert_eq!(
            file_save_path(&shared_file("report.PDF", "pdf"), "general"),
            "files/general/F0BNRE9PY.PDF"
        );
    }

    #[test]
    fn null_extension_uses_filetype() {
        assert_eq!(
            file_save_path(&shared_file("snippet.(null)", "text"), "dev"),
            "files/dev/F0BNRE9PY.text"
        );
    }

    #[test]
    fn missing_extension_and_filetype() {
        assert_eq!(
            file_save_path(&shared_file("README", ""), "dev"),
            "files/dev/F0BNRE9PY"
        );
    }

    #[test]
    fn external_file_links_to_url() {
        let mut file = shared_file("Design doc", "gdoc");
        file.is_external = true;
        file.url_private = "https://docs.google.com/document/d/abc".into();

        assert_eq!(
            file_save_path(&file, "general"),
            "https://docs.google.com/document/d/abc"
        );
    }

    #[test]
    fn avatar_path_uses_url_extension() {
        let mut avatars = BTreeMap::new();
        avatars.insert(
            "72".to_owned(),
            "https://avatars.slack-edge.com/2016-02-01/123_abc_72.jpg".to_owned(),
        );
        let user = UserProfile {
            id: "U023BECGF".into(),
            name: Some("bobby".into()),
            avatars,
        };

        assert_eq!(
            avatar_path(&user, "72").as_deref(),
            Some("avatars/72/U023BECGF_72.jpg")
        );
        assert!(avatar_path(&user, "512").is_none());
    }

    #[test]
    fn url_extension_ignores_query() {
        assert_eq!(url_extension("https://x.io/a/b.png?s=72&d=y.gif"), ".png");
        assert_eq!(url_extension("https://x.io/avatar/abc"), "");
        assert_eq!(url_extension("https://x.io/.hidden"), "");
    }
}
