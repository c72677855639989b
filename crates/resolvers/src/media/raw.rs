//! Raw adapter payloads, before normalization.

/// One media entry as reported by a provider. Providers are weakly
/// typed and shape-varying, so every field except `url` is optional
/// advisory metadata; the normalizer decides what it means.
#[derive(Debug, Clone, Default)]
pub struct RawMediaItem {
    pub url: String,
    /// Provider-declared quality/resolution string, if any.
    pub quality: Option<String>,
    /// Provider-declared type field ("video", "photo", "audio", ...).
    pub type_hint: Option<String>,
    /// Platform metadata explicitly marked this item as renderable
    /// video (e.g. Instagram's `is_video`).
    pub renderable_video: bool,
    pub size_bytes: Option<u64>,
}

impl RawMediaItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    pub fn type_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    pub fn renderable_video(mut self, renderable: bool) -> Self {
        self.renderable_video = renderable;
        self
    }

    pub fn size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }
}

/// Successful output of one provider adapter: post metadata plus the
/// raw media entries, in provider-returned order.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub title: String,
    pub thumbnail: String,
    /// Which (platform, provider-version) produced this result.
    pub source_version: &'static str,
    pub items: Vec<RawMediaItem>,
}

impl Extraction {
    pub fn new(source_version: &'static str) -> Self {
        Self {
            title: String::new(),
            thumbnail: String::new(),
            source_version,
            items: Vec::new(),
        }
    }
}
