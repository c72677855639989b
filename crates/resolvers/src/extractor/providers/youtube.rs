//! YouTube adapters.
//!
//! v1 calls the InnerTube player API with an Android client context
//! (serves unthrottled progressive URLs); v2 falls back to a public
//! Piped instance when InnerTube starts gating a video.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::extractor::error::ResolveError;
use crate::extractor::provider::{ProviderAdapter, ProviderClient};
use crate::extractor::utils::{str_field, u64_field};
use crate::media::{Extraction, RawMediaItem};

const INNERTUBE_PLAYER_API: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_VERSION: &str = "19.09.37";
const PIPED_API: &str = "https://pipedapi.kavin.rocks/streams";

/// Extract the 11-character video id from watch, shorts and youtu.be
/// URL shapes.
pub(crate) fn video_id(url: &str) -> Option<String> {
    let stripped = url.split(['?', '#']).next().unwrap_or(url);

    for marker in ["youtu.be/", "/shorts/", "/embed/"] {
        if let Some((_, tail)) = stripped.split_once(marker) {
            let id = tail.split(['/', '?', '&']).next().unwrap_or(tail);
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
    }

    // watch?v= lives in the query string.
    let query = url.split_once('?').map(|(_, q)| q)?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("v="))
        .filter(|id| !id.is_empty())
        .map(|id| id.split('#').next().unwrap_or(id).to_string())
}

fn best_thumbnail(details: &Value) -> String {
    details
        .get("thumbnail")
        .and_then(|t| t.get("thumbnails"))
        .and_then(Value::as_array)
        .and_then(|list| list.last())
        .and_then(|thumb| str_field(thumb, "url"))
        .unwrap_or_default()
        .to_string()
}

/// v1: InnerTube player API.
pub struct YoutubeInnertube {
    provider: ProviderClient,
}

impl YoutubeInnertube {
    pub fn new(client: Client) -> Self {
        let mut provider = ProviderClient::new("YouTube", client);
        provider.set_origin_static("https://www.youtube.com");
        Self { provider }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        let streaming = payload
            .get("streamingData")
            .filter(|s| s.is_object())
            .ok_or_else(|| {
                let status = payload
                    .get("playabilityStatus")
                    .and_then(|p| str_field(p, "status"))
                    .unwrap_or("no streamingData");
                ResolveError::BadPayload(format!("innertube: {status}"))
            })?;

        let mut extraction = Extraction::new("youtube-v1");
        if let Some(details) = payload.get("videoDetails") {
            extraction.title = str_field(details, "title").unwrap_or_default().to_string();
            extraction.thumbnail = best_thumbnail(details);
        }

        // Muxed formats first (video+audio in one file), then
        // adaptive ones; keep provider order within each list.
        for key in ["formats", "adaptiveFormats"] {
            let Some(formats) = streaming.get(key).and_then(Value::as_array) else {
                continue;
            };
            for format in formats {
                let Some(url) = str_field(format, "url") else {
                    // Ciphered formats carry `signatureCipher` instead
                    // of a usable URL; skip them.
                    continue;
                };
                let mime = str_field(format, "mimeType").unwrap_or_default();
                let mut item = RawMediaItem::new(url);
                item.size_bytes = u64_field(format, "contentLength");
                if mime.starts_with("audio/") {
                    item = item.quality("Audio Only").type_hint("audio");
                } else {
                    item = item.renderable_video(true);
                    if let Some(label) = str_field(format, "qualityLabel") {
                        item = item.quality(label);
                    }
                }
                extraction.items.push(item);
            }
        }

        Ok(extraction)
    }
}

#[async_trait]
impl ProviderAdapter for YoutubeInnertube {
    fn source_version(&self) -> &'static str {
        "youtube-v1"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let id = video_id(url)
            .ok_or_else(|| ResolveError::InvalidUrl(format!("no video id in {url}")))?;

        let body = json!({
            "videoId": id,
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                    "androidSdkVersion": 30,
                    "hl": "en"
                }
            }
        });

        let payload: Value = self
            .provider
            .post(INNERTUBE_PLAYER_API)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        self.parse_response(&payload)
    }
}

/// v2: public Piped instance.
pub struct YoutubePiped {
    provider: ProviderClient,
}

impl YoutubePiped {
    pub fn new(client: Client) -> Self {
        Self {
            provider: ProviderClient::new("YouTube", client),
        }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        if let Some(message) = str_field(payload, "error") {
            return Err(ResolveError::BadPayload(format!("piped: {message}")));
        }

        let mut extraction = Extraction::new("youtube-v2");
        extraction.title = str_field(payload, "title").unwrap_or_default().to_string();
        extraction.thumbnail = str_field(payload, "thumbnailUrl")
            .unwrap_or_default()
            .to_string();

        for stream in payload
            .get("videoStreams")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let Some(url) = str_field(stream, "url") else {
                continue;
            };
            let mut item = RawMediaItem::new(url).renderable_video(true);
            if let Some(quality) = str_field(stream, "quality") {
                item = item.quality(quality);
            }
            extraction.items.push(item);
        }

        for stream in payload
            .get("audioStreams")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let Some(url) = str_field(stream, "url") else {
                continue;
            };
            let quality = str_field(stream, "quality").unwrap_or("Audio Only");
            extraction
                .items
                .push(RawMediaItem::new(url).quality(quality).type_hint("audio"));
        }

        Ok(extraction)
    }
}

#[async_trait]
impl ProviderAdapter for YoutubePiped {
    fn source_version(&self) -> &'static str {
        "youtube-v2"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let id = video_id(url)
            .ok_or_else(|| ResolveError::InvalidUrl(format!("no video id in {url}")))?;

        let payload: Value = self
            .provider
            .get(&format!("{PIPED_API}/{id}"))
            .send()
            .await?
            .json()
            .await?;

        self.parse_response(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use serde_json::json;

    #[test]
    fn video_id_covers_url_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?app=desktop&v=dQw4w9WgXcQ&t=1",
        ] {
            assert_eq!(video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "url: {url}");
        }
        assert_eq!(video_id("https://www.youtube.com/feed/library"), None);
    }

    #[test]
    fn innertube_splits_video_and_audio_formats() {
        let adapter = YoutubeInnertube::new(Client::new());
        let payload = json!({
            "videoDetails": {
                "title": "a video",
                "thumbnail": {"thumbnails": [
                    {"url": "https://i.ytimg.com/small.jpg"},
                    {"url": "https://i.ytimg.com/large.jpg"}
                ]}
            },
            "streamingData": {
                "formats": [
                    {"url": "https://rr1.example/muxed", "qualityLabel": "720p",
                     "mimeType": "video/mp4; codecs=\"avc1\"", "contentLength": "1000"}
                ],
                "adaptiveFormats": [
                    {"url": "https://rr1.example/audio",
                     "mimeType": "audio/webm; codecs=\"opus\""},
                    {"signatureCipher": "s=..."}
                ]
            }
        });

        let extraction = adapter.parse_response(&payload).unwrap();
        assert_eq!(extraction.title, "a video");
        assert_eq!(extraction.thumbnail, "https://i.ytimg.com/large.jpg");
        assert_eq!(extraction.items.len(), 2, "ciphered format must be skipped");
        assert_eq!(extraction.items[0].quality.as_deref(), Some("720p"));
        assert_eq!(extraction.items[0].size_bytes, Some(1000));
        assert_eq!(extraction.items[1].type_hint.as_deref(), Some("audio"));
    }

    #[test]
    fn innertube_reports_playability_status_on_gated_videos() {
        let adapter = YoutubeInnertube::new(Client::new());
        let payload = json!({"playabilityStatus": {"status": "LOGIN_REQUIRED"}});
        match adapter.parse_response(&payload) {
            Err(ResolveError::BadPayload(msg)) => assert!(msg.contains("LOGIN_REQUIRED")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn piped_parses_stream_lists() {
        let adapter = YoutubePiped::new(Client::new());
        let payload = json!({
            "title": "t",
            "thumbnailUrl": "https://pipedproxy/thumb.jpg",
            "videoStreams": [
                {"url": "https://pipedproxy/v1080", "quality": "1080p"},
                {"quality": "720p"}
            ],
            "audioStreams": [{"url": "https://pipedproxy/a", "quality": "128 kbps"}]
        });

        let extraction = adapter.parse_response(&payload).unwrap();
        assert_eq!(extraction.items.len(), 2, "entry without url must be dropped");
        assert_eq!(extraction.items[0].quality.as_deref(), Some("1080p"));
        assert_eq!(extraction.items[1].type_hint.as_deref(), Some("audio"));
    }

    #[test]
    fn piped_surfaces_error_body() {
        let adapter = YoutubePiped::new(Client::new());
        let payload = json!({"error": "Video unavailable"});
        assert!(adapter.parse_response(&payload).is_err());
    }
}
