//! Facebook adapters.
//!
//! There is no stable unauthenticated JSON surface for Facebook
//! video, so both strategies read playback markers out of page HTML:
//! v1 from the desktop page's inline data, v2 from the mbasic
//! rendition's redirect links.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::extractor::error::ResolveError;
use crate::extractor::provider::{ProviderAdapter, ProviderClient};
use crate::extractor::utils::unescape_json_string;
use crate::media::{Extraction, RawMediaItem};

static HD_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""playable_url_quality_hd"\s*:\s*"([^"]+)""#).expect("valid regex")
});
static SD_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""playable_url"\s*:\s*"([^"]+)""#).expect("valid regex"));
static OG_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta[^>]*property="og:image"[^>]*content="([^"]+)""#).expect("valid regex")
});
static OG_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta[^>]*property="og:title"[^>]*content="([^"]+)""#).expect("valid regex")
});
static CANONICAL_WATCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="(/watch/\?v=\d+)""#).expect("valid regex"));
static VIDEO_REDIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="/video_redirect/\?src=([^"&]+)"#).expect("valid regex")
});

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// v1: desktop page inline data.
pub struct FacebookPage {
    provider: ProviderClient,
}

impl FacebookPage {
    pub fn new(client: Client) -> Self {
        let mut provider = ProviderClient::new("Facebook", client);
        provider.set_referer_static("https://www.facebook.com/");
        Self { provider }
    }

    pub(crate) fn parse_page(&self, html: &str) -> Extraction {
        let mut extraction = Extraction::new("facebook-v1");
        extraction.title = first_capture(&OG_TITLE_RE, html).unwrap_or_default();
        extraction.thumbnail = first_capture(&OG_IMAGE_RE, html)
            .map(|raw| unescape_json_string(&raw))
            .unwrap_or_default();

        if let Some(hd) = first_capture(&HD_URL_RE, html) {
            extraction.items.push(
                RawMediaItem::new(unescape_json_string(&hd))
                    .quality("HD")
                    .renderable_video(true),
            );
        }
        if let Some(sd) = first_capture(&SD_URL_RE, html) {
            extraction.items.push(
                RawMediaItem::new(unescape_json_string(&sd))
                    .quality("SD")
                    .renderable_video(true),
            );
        }

        extraction
    }

    /// Canonical `/watch/?v=` link, for posts that only embed the
    /// video instead of carrying its markers inline.
    pub(crate) fn canonical_watch_url(html: &str) -> Option<String> {
        first_capture(&CANONICAL_WATCH_RE, html)
            .map(|path| format!("https://www.facebook.com{}", path.replace("&amp;", "&")))
    }
}

#[async_trait]
impl ProviderAdapter for FacebookPage {
    fn source_version(&self) -> &'static str {
        "facebook-v1"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let html = self.provider.get(url).send().await?.text().await?;
        let extraction = self.parse_page(&html);
        if !extraction.items.is_empty() {
            return Ok(extraction);
        }

        // Cross-reference: one follow-up fetch of the canonical watch
        // page, never more.
        if let Some(watch_url) = Self::canonical_watch_url(&html) {
            let html = self.provider.get(&watch_url).send().await?.text().await?;
            let extraction = self.parse_page(&html);
            if !extraction.items.is_empty() {
                return Ok(extraction);
            }
        }

        Err(ResolveError::BadPayload("page: no playback markers".into()))
    }
}

/// v2: mbasic rendition.
pub struct FacebookBasic {
    provider: ProviderClient,
}

impl FacebookBasic {
    pub fn new(client: Client) -> Self {
        let mut provider = ProviderClient::new("Facebook", client);
        provider.set_referer_static("https://mbasic.facebook.com/");
        Self { provider }
    }

    fn mbasic_url(url: &str) -> String {
        url.replacen("www.facebook.com", "mbasic.facebook.com", 1)
            .replacen("://facebook.com", "://mbasic.facebook.com", 1)
    }

    pub(crate) fn parse_page(&self, html: &str) -> Result<Extraction, ResolveError> {
        let mut extraction = Extraction::new("facebook-v2");
        extraction.title = first_capture(&OG_TITLE_RE, html).unwrap_or_default();
        extraction.thumbnail = first_capture(&OG_IMAGE_RE, html).unwrap_or_default();

        for capture in VIDEO_REDIRECT_RE.captures_iter(html) {
            let Some(encoded) = capture.get(1) else { continue };
            let Ok(decoded) = urlencoding::decode(encoded.as_str()) else {
                continue;
            };
            extraction.items.push(
                RawMediaItem::new(decoded.replace("&amp;", "&"))
                    .quality("SD")
                    .renderable_video(true),
            );
        }

        if extraction.items.is_empty() {
            return Err(ResolveError::BadPayload("mbasic: no redirect links".into()));
        }
        Ok(extraction)
    }
}

#[async_trait]
impl ProviderAdapter for FacebookBasic {
    fn source_version(&self) -> &'static str {
        "facebook-v2"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let html = self
            .provider
            .get(&Self::mbasic_url(url))
            .send()
            .await?
            .text()
            .await?;
        self.parse_page(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    #[test]
    fn page_markers_yield_hd_and_sd() {
        let adapter = FacebookPage::new(Client::new());
        let html = concat!(
            r#"<meta property="og:title" content="Some video" />"#,
            r#"<meta property="og:image" content="https://scontent.xx.fbcdn.net/th.jpg" />"#,
            r#"{"playable_url":"https:\/\/video.xx.fbcdn.net\/sd.mp4","#,
            r#""playable_url_quality_hd":"https:\/\/video.xx.fbcdn.net\/hd.mp4"}"#,
        );

        let extraction = adapter.parse_page(html);
        assert_eq!(extraction.title, "Some video");
        assert_eq!(extraction.items.len(), 2);
        assert_eq!(extraction.items[0].url, "https://video.xx.fbcdn.net/hd.mp4");
        assert_eq!(extraction.items[0].quality.as_deref(), Some("HD"));
        assert_eq!(extraction.items[1].url, "https://video.xx.fbcdn.net/sd.mp4");
    }

    #[test]
    fn canonical_watch_link_is_detected() {
        let html = r#"<a href="/watch/?v=123456789">Watch</a>"#;
        assert_eq!(
            FacebookPage::canonical_watch_url(html).as_deref(),
            Some("https://www.facebook.com/watch/?v=123456789")
        );
        assert!(FacebookPage::canonical_watch_url("<p>nothing</p>").is_none());
    }

    #[test]
    fn mbasic_decodes_redirect_src() {
        let adapter = FacebookBasic::new(Client::new());
        let html = r#"<a href="/video_redirect/?src=https%3A%2F%2Fvideo.xx.fbcdn.net%2Fv.mp4%3Fa%3D1">Play</a>"#;

        let extraction = adapter.parse_page(html).unwrap();
        assert_eq!(extraction.items.len(), 1);
        assert_eq!(
            extraction.items[0].url,
            "https://video.xx.fbcdn.net/v.mp4?a=1"
        );
    }

    #[test]
    fn mbasic_without_links_is_a_failure() {
        let adapter = FacebookBasic::new(Client::new());
        assert!(adapter.parse_page("<html></html>").is_err());
    }

    #[test]
    fn mbasic_url_rewrite() {
        assert_eq!(
            FacebookBasic::mbasic_url("https://www.facebook.com/reel/1"),
            "https://mbasic.facebook.com/reel/1"
        );
        assert_eq!(
            FacebookBasic::mbasic_url("https://facebook.com/watch/?v=2"),
            "https://mbasic.facebook.com/watch/?v=2"
        );
    }
}
