//! API request and response models.

use serde::{Deserialize, Serialize};

use media_resolvers::{MediaFormat, MediaResolution};

/// Query parameters for `GET /api/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    /// Platform tag, e.g. "video-host". Detected from the URL when
    /// omitted.
    pub platform: Option<String>,
    /// Full post URL.
    pub url: Option<String>,
    /// Bare post id, expanded into the platform's canonical URL.
    /// Requires `platform`.
    pub id: Option<String>,
}

/// A single downloadable format.
#[derive(Debug, Serialize)]
pub struct FormatEntry {
    pub quality: String,
    pub url: String,
    /// "video", "audio" or "image".
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl From<MediaFormat> for FormatEntry {
    fn from(format: MediaFormat) -> Self {
        Self {
            quality: format.quality,
            url: format.url,
            format: format.kind.as_str().to_string(),
            size: format.size_bytes,
        }
    }
}

/// Response body for `GET /api/resolve`.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub title: String,
    pub thumbnail: String,
    /// Dominant kind across formats; drives player vs gallery UIs.
    #[serde(rename = "type")]
    pub media_type: String,
    pub formats: Vec<FormatEntry>,
}

impl From<MediaResolution> for ResolveResponse {
    fn from(resolution: MediaResolution) -> Self {
        Self {
            title: resolution.title,
            thumbnail: resolution.thumbnail,
            media_type: resolution.primary_kind.as_str().to_string(),
            formats: resolution.formats.into_iter().map(Into::into).collect(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}
