//! TikTok adapters.
//!
//! v1 goes through the tikwm resolver service; v2 talks to the
//! mobile feed API directly. Both strategies break independently as
//! upstream changes, which is why they are chained.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::extractor::error::ResolveError;
use crate::extractor::provider::{ProviderAdapter, ProviderClient};
use crate::extractor::utils::{str_field, string_or_first, u64_field};
use crate::media::{Extraction, RawMediaItem};

const TIKWM_API: &str = "https://www.tikwm.com/api/";
const FEED_API: &str = "https://api22-normal-c-alisg.tiktokv.com/aweme/v1/feed/";

/// Pull the numeric post id out of a canonical TikTok URL.
fn post_id(url: &str) -> Option<&str> {
    let (_, tail) = url.split_once("/video/")?;
    let id = tail.split(['?', '/', '#']).next().unwrap_or(tail);
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

/// v1: tikwm resolver service.
pub struct TikTokTikwm {
    provider: ProviderClient,
}

impl TikTokTikwm {
    pub fn new(client: Client) -> Self {
        Self {
            provider: ProviderClient::new("TikTok", client),
        }
    }

    /// tikwm returns `play`/`hd_play` as site-relative paths when it
    /// serves the file itself.
    fn absolute(url: &str) -> String {
        if url.starts_with('/') {
            format!("https://www.tikwm.com{url}")
        } else {
            url.to_string()
        }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        // Minimal envelope: a zero status code and a data object.
        if payload.get("code").and_then(Value::as_i64) != Some(0) {
            let msg = str_field(payload, "msg").unwrap_or("non-zero status code");
            return Err(ResolveError::BadPayload(format!("tikwm: {msg}")));
        }
        let data = payload
            .get("data")
            .filter(|d| d.is_object())
            .ok_or_else(|| ResolveError::BadPayload("tikwm: missing data object".into()))?;

        let mut extraction = Extraction::new("tiktok-v1");
        extraction.title = str_field(data, "title").unwrap_or_default().to_string();
        extraction.thumbnail = str_field(data, "cover")
            .map(Self::absolute)
            .unwrap_or_default();

        if let Some(hd) = str_field(data, "hd_play") {
            let mut item = RawMediaItem::new(Self::absolute(hd))
                .quality("HD")
                .renderable_video(true);
            item.size_bytes = u64_field(data, "hd_size");
            extraction.items.push(item);
        }
        if let Some(play) = str_field(data, "play") {
            let mut item = RawMediaItem::new(Self::absolute(play))
                .quality("Original")
                .renderable_video(true);
            item.size_bytes = u64_field(data, "size");
            extraction.items.push(item);
        }
        if let Some(wm) = str_field(data, "wmplay") {
            extraction.items.push(
                RawMediaItem::new(Self::absolute(wm))
                    .quality("Watermarked")
                    .renderable_video(true),
            );
        }
        if let Some(music) = str_field(data, "music") {
            extraction.items.push(
                RawMediaItem::new(Self::absolute(music))
                    .quality("Audio Only")
                    .type_hint("audio"),
            );
        }

        Ok(extraction)
    }
}

#[async_trait]
impl ProviderAdapter for TikTokTikwm {
    fn source_version(&self) -> &'static str {
        "tiktok-v1"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let payload: Value = self
            .provider
            .get(TIKWM_API)
            .query(&[("url", url), ("hd", "1")])
            .send()
            .await?
            .json()
            .await?;

        self.parse_response(&payload)
    }
}

/// v2: mobile feed API.
pub struct TikTokFeed {
    provider: ProviderClient,
}

impl TikTokFeed {
    pub fn new(client: Client) -> Self {
        let mut provider = ProviderClient::new("TikTok", client);
        provider.set_referer_static("https://www.tiktok.com/");
        Self { provider }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        // The post record shows up either at the root or as the first
        // entry of `aweme_list`, depending on API flavor.
        let post = if payload.get("video").is_some() {
            payload
        } else {
            payload
                .get("aweme_list")
                .and_then(|l| l.get(0))
                .ok_or_else(|| ResolveError::BadPayload("feed: no post record".into()))?
        };

        let video = post
            .get("video")
            .filter(|v| v.is_object())
            .ok_or_else(|| ResolveError::BadPayload("feed: missing video object".into()))?;

        // `playAddr` is a bare string in some responses and a url
        // list in others.
        let play_addr = video
            .get("playAddr")
            .and_then(string_or_first)
            .or_else(|| {
                video
                    .get("play_addr")
                    .and_then(|p| p.get("url_list"))
                    .and_then(string_or_first)
            })
            .ok_or_else(|| ResolveError::BadPayload("feed: no play address".into()))?;

        let mut extraction = Extraction::new("tiktok-v2");
        extraction.title = str_field(post, "desc").unwrap_or_default().to_string();
        extraction.thumbnail = video
            .get("cover")
            .and_then(string_or_first)
            .or_else(|| {
                video
                    .get("cover")
                    .and_then(|c| c.get("url_list"))
                    .and_then(string_or_first)
            })
            .unwrap_or_default()
            .to_string();

        extraction.items.push(
            RawMediaItem::new(play_addr)
                .quality("Original")
                .renderable_video(true),
        );

        // Audio-only companion: the track URL when present, otherwise
        // the play address itself (the container carries the audio).
        let audio_url = post
            .get("music")
            .and_then(|m| m.get("playUrl"))
            .and_then(string_or_first)
            .unwrap_or(play_addr);
        extraction
            .items
            .push(RawMediaItem::new(audio_url).quality("Audio Only").type_hint("audio"));

        Ok(extraction)
    }
}

#[async_trait]
impl ProviderAdapter for TikTokFeed {
    fn source_version(&self) -> &'static str {
        "tiktok-v2"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let id = post_id(url)
            .ok_or_else(|| ResolveError::InvalidUrl(format!("no post id in {url}")))?;

        let payload: Value = self
            .provider
            .get(FEED_API)
            .query(&[("aweme_id", id)])
            .send()
            .await?
            .json()
            .await?;

        self.parse_response(&payload)
    }
}
