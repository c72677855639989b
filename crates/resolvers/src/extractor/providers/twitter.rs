//! Twitter/X adapters.
//!
//! v1 reads the syndication CDN (the embed backend, no auth); v2
//! falls back to the vxtwitter mirror API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::extractor::error::ResolveError;
use crate::extractor::provider::{ProviderAdapter, ProviderClient};
use crate::extractor::utils::str_field;
use crate::media::{Extraction, RawMediaItem};

const SYNDICATION_API: &str = "https://cdn.syndication.twimg.com/tweet-result";
const VX_API: &str = "https://api.vxtwitter.com";

/// Tweet id from `/status/<id>` URL shapes.
pub(crate) fn tweet_id(url: &str) -> Option<&str> {
    let (_, tail) = url.split_once("/status/")?;
    let id = tail.split(['?', '/', '#']).next().unwrap_or(tail);
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

/// v1: syndication CDN.
pub struct TwitterSyndication {
    provider: ProviderClient,
}

impl TwitterSyndication {
    pub fn new(client: Client) -> Self {
        let mut provider = ProviderClient::new("Twitter", client);
        provider.set_referer_static("https://platform.twitter.com/");
        Self { provider }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        if payload.get("tombstone").is_some() {
            return Err(ResolveError::BadPayload("syndication: tweet unavailable".into()));
        }

        let mut extraction = Extraction::new("twitter-v1");
        extraction.title = str_field(payload, "text").unwrap_or_default().to_string();

        let details = payload
            .get("mediaDetails")
            .and_then(Value::as_array)
            .ok_or_else(|| ResolveError::BadPayload("syndication: no mediaDetails".into()))?;

        for media in details {
            match str_field(media, "type") {
                Some("video") | Some("animated_gif") => {
                    if extraction.thumbnail.is_empty()
                        && let Some(poster) = str_field(media, "media_url_https")
                    {
                        extraction.thumbnail = poster.to_string();
                    }
                    // Highest-bitrate mp4 variant wins; m3u8 variants
                    // are skipped (players, not downloads).
                    let variant = media
                        .get("video_info")
                        .and_then(|v| v.get("variants"))
                        .and_then(Value::as_array)
                        .and_then(|variants| {
                            variants
                                .iter()
                                .filter(|v| {
                                    str_field(v, "content_type") == Some("video/mp4")
                                })
                                .max_by_key(|v| {
                                    v.get("bitrate").and_then(Value::as_u64).unwrap_or(0)
                                })
                        });
                    if let Some(variant) = variant
                        && let Some(url) = str_field(variant, "url")
                    {
                        extraction.items.push(
                            RawMediaItem::new(url)
                                .quality("Original")
                                .renderable_video(true),
                        );
                    }
                }
                Some("photo") => {
                    if let Some(url) = str_field(media, "media_url_https") {
                        if extraction.thumbnail.is_empty() {
                            extraction.thumbnail = url.to_string();
                        }
                        extraction
                            .items
                            .push(RawMediaItem::new(url).type_hint("photo"));
                    }
                }
                _ => {}
            }
        }

        Ok(extraction)
    }
}

#[async_trait]
impl ProviderAdapter for TwitterSyndication {
    fn source_version(&self) -> &'static str {
        "twitter-v1"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let id = tweet_id(url)
            .ok_or_else(|| ResolveError::InvalidUrl(format!("no tweet id in {url}")))?;

        let payload: Value = self
            .provider
            .get(SYNDICATION_API)
            // The token parameter is required but not validated
            // against the id.
            .query(&[("id", id), ("token", "a")])
            .send()
            .await?
            .json()
            .await?;

        self.parse_response(&payload)
    }
}

/// v2: vxtwitter mirror.
pub struct TwitterVx {
    provider: ProviderClient,
}

impl TwitterVx {
    pub fn new(client: Client) -> Self {
        Self {
            provider: ProviderClient::new("Twitter", client),
        }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        let media = payload
            .get("media_extended")
            .and_then(Value::as_array)
            .ok_or_else(|| ResolveError::BadPayload("vxtwitter: no media_extended".into()))?;

        let mut extraction = Extraction::new("twitter-v2");
        extraction.title = str_field(payload, "text").unwrap_or_default().to_string();

        for entry in media {
            let Some(url) = str_field(entry, "url") else {
                continue;
            };
            let kind = str_field(entry, "type").unwrap_or_default();
            if extraction.thumbnail.is_empty()
                && let Some(thumb) = str_field(entry, "thumbnail_url")
            {
                extraction.thumbnail = thumb.to_string();
            }

            let item = match kind {
                "video" | "gif" => RawMediaItem::new(url)
                    .quality("Original")
                    .renderable_video(true),
                _ => RawMediaItem::new(url).type_hint(kind),
            };
            extraction.items.push(item);
        }

        Ok(extraction)
    }
}

#[async_trait]
impl ProviderAdapter for TwitterVx {
    fn source_version(&self) -> &'static str {
        "twitter-v2"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let id = tweet_id(url)
            .ok_or_else(|| ResolveError::InvalidUrl(format!("no tweet id in {url}")))?;

        let payload: Value = self
            .provider
            .get(&format!("{VX_API}/i/status/{id}"))
            .send()
            .await?
            .json()
            .await?;

        self.parse_response(&payload)
    }
}
