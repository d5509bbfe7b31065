//! Share-link resolver: turns a Loom share URL into the video id the API expects.
//!
//! # Example
//!
//! ```rust
//! use loom_core::resolver::extract_video_id;
//!
//! let id = extract_video_id("https://www.loom.com/share/abc123?sid=xyz").unwrap();
//! assert_eq!(id.as_str(), "abc123");
//!
//! assert!(extract_video_id("https://www.loom.com/looms/videos").is_none());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First path segment after `/share/`, up to the next `/` or `?`.
static SHARE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/share/(?P<video_id>[^/?]+)").expect("share pattern compiles"));

/// Identifier of a Loom video as taken from its share URL.
///
/// Only [`extract_video_id`] builds one, so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the video id from a share URL.
///
/// Returns `None` when the input has no `/share/<id>` segment. Never panics.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    SHARE_PATTERN
        .captures(url)
        .and_then(|caps| caps.name("video_id"))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
        .map(|id| VideoId(id.to_string()))
}
