//! Platform classification for arbitrary input URLs.
//!
//! Classification is a pure, total function: any input maps to a
//! [`PlatformTag`], with `Unknown` for everything unrecognized.
//! Matching is ordered and first-match-wins, so more specific rules
//! (Reel paths) sit above their host's generic rule.

use serde::{Deserialize, Serialize};
use url::Url;

/// Platform tag derived from an input URL. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformTag {
    /// Long-form video hosts (YouTube).
    VideoHost,
    /// Photo-first hosts (Instagram posts).
    PhotoHost,
    /// Microblogs with attached media (Twitter/X).
    MicroblogHost,
    /// Short-clip hosts (TikTok, Reels).
    ShortVideoHost,
    /// Generic social hosts (Facebook).
    GenericHost,
    /// The URL is itself the asset; extraction is bypassed.
    DirectMedia,
    Unknown,
}

impl PlatformTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::VideoHost => "video-host",
            PlatformTag::PhotoHost => "photo-host",
            PlatformTag::MicroblogHost => "microblog-host",
            PlatformTag::ShortVideoHost => "short-video-host",
            PlatformTag::GenericHost => "generic-host",
            PlatformTag::DirectMedia => "direct-media",
            PlatformTag::Unknown => "unknown",
        }
    }

    pub fn from_str(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "video-host" => Some(PlatformTag::VideoHost),
            "photo-host" => Some(PlatformTag::PhotoHost),
            "microblog-host" => Some(PlatformTag::MicroblogHost),
            "short-video-host" => Some(PlatformTag::ShortVideoHost),
            "generic-host" => Some(PlatformTag::GenericHost),
            "direct-media" => Some(PlatformTag::DirectMedia),
            _ => None,
        }
    }
}

/// Ordered substring rules; first match wins. Reel paths come before
/// their host's generic rule so short clips land on the short-video
/// chain.
const PLATFORM_RULES: &[(&str, PlatformTag)] = &[
    ("tiktok.com", PlatformTag::ShortVideoHost),
    ("instagram.com/reel", PlatformTag::ShortVideoHost),
    ("facebook.com/reel", PlatformTag::ShortVideoHost),
    ("youtube.com", PlatformTag::VideoHost),
    ("youtu.be", PlatformTag::VideoHost),
    ("instagram.com", PlatformTag::PhotoHost),
    ("twitter.com", PlatformTag::MicroblogHost),
    ("://x.com", PlatformTag::MicroblogHost),
    ("www.x.com", PlatformTag::MicroblogHost),
    ("mobile.x.com", PlatformTag::MicroblogHost),
    ("facebook.com", PlatformTag::GenericHost),
    ("fb.watch", PlatformTag::GenericHost),
];

/// Extensions that mark a URL as the asset itself.
const MEDIA_EXTENSIONS: &[&str] = &[
    ".mp4", ".webm", ".mov", ".mkv", ".m4v", ".avi", ".flv", ".mp3", ".m4a", ".wav", ".ogg",
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp",
];

/// Classify an input URL by source platform.
///
/// Total function: malformed or empty inputs yield
/// [`PlatformTag::Unknown`] instead of failing.
pub fn classify(url: &str) -> PlatformTag {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return PlatformTag::Unknown;
    }

    if is_direct_media(trimmed) {
        return PlatformTag::DirectMedia;
    }

    let lowered = trimmed.to_lowercase();
    for (needle, tag) in PLATFORM_RULES {
        if lowered.contains(needle) {
            return *tag;
        }
    }

    PlatformTag::Unknown
}

/// True when the URL points at a media file directly: a `data:` or
/// `blob:` URI, or a path ending in a known media extension.
pub fn is_direct_media(url: &str) -> bool {
    let lowered = url.trim().to_lowercase();
    if lowered.starts_with("data:") || lowered.starts_with("blob:") {
        return true;
    }

    // Extension check runs against the path only; CDN URLs routinely
    // carry signatures in the query string.
    let path = lowered
        .split(['?', '#'])
        .next()
        .unwrap_or(lowered.as_str());
    MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// True only for absolute `http`/`https` URLs.
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s.trim()) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
