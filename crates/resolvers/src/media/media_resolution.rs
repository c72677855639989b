use serde::{Deserialize, Serialize};

use super::media_format::{MediaFormat, MediaKind};

/// Terminal output of the resolution pipeline.
///
/// Invariant: `formats` is never empty. A run that produces zero
/// usable formats is a failure, not a success with an empty list.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MediaResolution {
    pub title: String,
    pub thumbnail: String,
    pub primary_kind: MediaKind,
    pub formats: Vec<MediaFormat>,
}

impl MediaResolution {
    /// Build a resolution from normalized formats. Returns `None`
    /// when `formats` is empty so callers cannot violate the
    /// non-empty invariant.
    pub fn from_formats(
        title: impl Into<String>,
        thumbnail: impl Into<String>,
        formats: Vec<MediaFormat>,
    ) -> Option<Self> {
        if formats.is_empty() {
            return None;
        }
        let primary_kind = if formats.iter().any(|f| f.kind == MediaKind::Video) {
            MediaKind::Video
        } else {
            MediaKind::Image
        };
        Some(Self {
            title: title.into(),
            thumbnail: thumbnail.into(),
            primary_kind,
            formats,
        })
    }
}
