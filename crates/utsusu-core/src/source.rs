//! Video URL validation and the short label shown in history.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Host markers accepted as a video URL
const HOST_MARKERS: &[&str] = &["youtube.com", "youtu.be"];

/// Characters of the video id kept in the derived title
const TITLE_ID_CHARS: usize = 8;

/// Hint shown under the input while the URL is not acceptable
pub const INVALID_URL_HINT: &str = "YouTube の URL を入力してください";

static VIDEO_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]v=([^&]+)").expect("static regex is valid")
});

/// Whether the raw input looks like a supported video URL.
///
/// This is a substring check on the host marker, nothing is resolved.
pub fn is_supported_url(url: &str) -> bool {
    HOST_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Extract the video id: the `v` query parameter, else the last path segment.
pub fn video_id(url: &str) -> &str {
    if let Some(caps) = VIDEO_PARAM.captures(url) {
        if let Some(m) = caps.get(1) {
            return m.as_str();
        }
    }
    url.rsplit('/').next().unwrap_or("")
}

/// History label for a URL, e.g. `動画 dQw4w9Wg`.
pub fn derive_title(url: &str) -> String {
    let id: String = video_id(url).chars().take(TITLE_ID_CHARS).collect();
    format!("動画 {}", id)
}

/// A validated video URL ready to hand to the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSource {
    url: String,
}

impl VideoSource {
    /// Validate user input. Surrounding whitespace is ignored for the check
    /// but the URL is kept as submitted.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("URL is empty".to_string()));
        }
        if !is_supported_url(trimmed) {
            return Err(Error::InvalidInput(format!(
                "not a YouTube URL: {}",
                trimmed
            )));
        }
        Ok(Self {
            url: input.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn video_id(&self) -> &str {
        video_id(&self.url)
    }

    pub fn derived_title(&self) -> String {
        derive_title(&self.url)
    }
}
