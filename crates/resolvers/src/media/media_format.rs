use serde::{Deserialize, Serialize};

/// Kind of a downloadable asset.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
        }
    }

    pub fn from_str(kind: &str) -> Option<Self> {
        match kind.to_lowercase().as_str() {
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            "image" => Some(MediaKind::Image),
            _ => None,
        }
    }
}

/// One selectable download, in normalized form.
///
/// Ordering inside a resolution is insertion order from
/// normalization; no sorting is applied on top of it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MediaFormat {
    /// Human-readable quality label, e.g. "1080p", "Original".
    pub quality: String,
    pub url: String,
    pub kind: MediaKind,
    /// Declared size when the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}
