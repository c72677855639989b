//! Normalization of raw provider items into uniform media formats.
//!
//! `normalize` never fails: unusable entries are dropped silently,
//! and classification falls back to heuristics over the URL when the
//! provider's own metadata is missing or untrustworthy.

use std::collections::HashMap;

use crate::classifier::PlatformTag;
use crate::media::{MediaFormat, MediaKind, RawMediaItem};

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov", ".mkv", ".m4v", ".avi", ".flv"];

/// Markers of streaming manifests and manifest-style CDN paths; these
/// are video regardless of extension.
const VIDEO_MANIFEST_MARKERS: &[&str] = &["video_manifest", ".m3u8", ".mpd", "/manifest"];

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".heic"];

/// CDN paths that serve preview frames rather than assets. Used only
/// for the short-video thumbnail-noise rule.
const CDN_IMAGE_PATH_MARKERS: &[&str] = &["scontent", "/photo/", "~tplv-"];

fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

pub(crate) fn has_image_extension(url: &str) -> bool {
    let path = url_path(url).to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn has_video_extension(url: &str) -> bool {
    let path = url_path(url).to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn has_manifest_marker(url: &str) -> bool {
    let lowered = url.to_lowercase();
    VIDEO_MANIFEST_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Thumbnail noise: short clips are video content, so an
/// image-extension URL on a CDN image-serving path alongside them is
/// a preview frame, not a downloadable asset.
fn is_thumbnail_noise(tag: PlatformTag, url: &str) -> bool {
    if tag != PlatformTag::ShortVideoHost || !has_image_extension(url) {
        return false;
    }
    let lowered = url.to_lowercase();
    CDN_IMAGE_PATH_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Classification precedence, in order: explicit renderable marker,
/// provider-declared type, URL shape, then default.
fn classify_item(item: &RawMediaItem) -> MediaKind {
    if item.renderable_video {
        return MediaKind::Video;
    }
    if let Some(hint) = item.type_hint.as_deref() {
        if hint.eq_ignore_ascii_case("video") {
            return MediaKind::Video;
        }
        if hint.eq_ignore_ascii_case("audio") {
            return MediaKind::Audio;
        }
    }
    if has_video_extension(&item.url) || has_manifest_marker(&item.url) {
        return MediaKind::Video;
    }
    if has_image_extension(&item.url) {
        return MediaKind::Image;
    }
    // No recognizable image extension: assume a video container.
    // CDNs routinely omit extensions on video URLs. Known to
    // misclassify audio-only and document links; kept for
    // compatibility with observed provider behavior.
    MediaKind::Video
}

/// Normalize raw items into the uniform format list.
///
/// Output order is insertion order; items are not de-duplicated by
/// URL (a provider returning the same URL twice yields two entries).
pub fn normalize(tag: PlatformTag, items: &[RawMediaItem]) -> Vec<MediaFormat> {
    let mut formats = Vec::with_capacity(items.len());
    let mut label_counts: HashMap<String, usize> = HashMap::new();

    for (index, item) in items.iter().enumerate() {
        if item.url.trim().is_empty() {
            continue;
        }
        if is_thumbnail_noise(tag, &item.url) {
            continue;
        }

        let kind = classify_item(item);
        let base_label = item
            .quality
            .clone()
            .unwrap_or_else(|| format!("Media {}", index + 1));

        let seen = label_counts.entry(base_label.clone()).or_insert(0);
        *seen += 1;
        let quality = if *seen > 1 {
            format!("{base_label} ({seen})")
        } else {
            base_label
        };

        formats.push(MediaFormat {
            quality,
            url: item.url.clone(),
            kind,
            size_bytes: item.size_bytes,
        });
    }

    formats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str) -> RawMediaItem {
        RawMediaItem::new(url)
    }

    #[test]
    fn jpg_without_video_marker_is_image() {
        let formats = normalize(PlatformTag::PhotoHost, &[item("https://cdn/a.jpg")]);
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].kind, MediaKind::Image);
    }

    #[test]
    fn manifest_marker_wins_over_extension() {
        let formats = normalize(
            PlatformTag::PhotoHost,
            &[item("https://cdn/video_manifest/render.jpg")],
        );
        assert_eq!(formats[0].kind, MediaKind::Video);
    }

    #[test]
    fn renderable_marker_beats_everything() {
        let formats = normalize(
            PlatformTag::PhotoHost,
            &[item("https://cdn/frame.jpg").renderable_video(true)],
        );
        assert_eq!(formats[0].kind, MediaKind::Video);
    }

    #[test]
    fn unrecognized_extension_defaults_to_video() {
        let formats = normalize(PlatformTag::MicroblogHost, &[item("https://cdn/asset")]);
        assert_eq!(formats[0].kind, MediaKind::Video);
    }

    #[test]
    fn audio_hint_is_honored() {
        let formats = normalize(
            PlatformTag::ShortVideoHost,
            &[item("https://cdn/track.mp3").type_hint("audio")],
        );
        assert_eq!(formats[0].kind, MediaKind::Audio);
    }

    #[test]
    fn short_video_thumbnail_noise_is_dropped_entirely() {
        let items = [
            item("https://scontent.cdninstagram.com/reel-frame.jpg"),
            item("https://cdn/clip.mp4").renderable_video(true),
        ];
        let formats = normalize(PlatformTag::ShortVideoHost, &items);
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].url, "https://cdn/clip.mp4");
    }

    #[test]
    fn same_image_is_kept_for_photo_hosts() {
        // The noise rule is scoped to short-video content only.
        let formats = normalize(
            PlatformTag::PhotoHost,
            &[item("https://scontent.cdninstagram.com/post.jpg")],
        );
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].kind, MediaKind::Image);
    }

    #[test]
    fn labels_synthesized_from_position_and_deduplicated() {
        let items = [
            item("https://cdn/1.jpg"),
            item("https://cdn/2.jpg"),
            item("https://cdn/v1.mp4").quality("HD"),
            item("https://cdn/v2.mp4").quality("HD"),
        ];
        let formats = normalize(PlatformTag::PhotoHost, &items);
        assert_eq!(formats[0].quality, "Media 1");
        assert_eq!(formats[1].quality, "Media 2");
        assert_eq!(formats[2].quality, "HD");
        assert_eq!(formats[3].quality, "HD (2)");
    }

    #[test]
    fn duplicate_urls_yield_duplicate_entries() {
        let items = [item("https://cdn/x.mp4"), item("https://cdn/x.mp4")];
        let formats = normalize(PlatformTag::GenericHost, &items);
        assert_eq!(formats.len(), 2);
    }

    #[test]
    fn empty_urls_are_dropped_silently() {
        let items = [item(""), item("https://cdn/x.mp4")];
        let formats = normalize(PlatformTag::GenericHost, &items);
        assert_eq!(formats.len(), 1);
    }
}
