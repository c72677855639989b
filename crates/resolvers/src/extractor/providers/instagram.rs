//! Instagram adapters.
//!
//! v1 asks the web endpoint for its JSON rendition (`?__a=1&__d=dis`);
//! v2 goes through the GraphQL query endpoint with the post
//! shortcode. Both return the same `shortcode_media` node at
//! different nesting depths, so parsing is shared.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::extractor::error::ResolveError;
use crate::extractor::provider::{ProviderAdapter, ProviderClient, ProviderCredentials};
use crate::extractor::utils::str_field;
use crate::media::{Extraction, RawMediaItem};

const GRAPHQL_API: &str = "https://www.instagram.com/graphql/query/";
const SHORTCODE_MEDIA_QUERY_HASH: &str = "b3055c01b4b222b8a47dc12b090e4e64";

/// Post shortcode from `/p/`, `/reel/` and `/tv/` URL shapes.
pub(crate) fn shortcode(url: &str) -> Option<&str> {
    let stripped = url.split(['?', '#']).next().unwrap_or(url);
    for marker in ["/p/", "/reel/", "/reels/", "/tv/"] {
        if let Some((_, tail)) = stripped.split_once(marker) {
            let code = tail.split('/').next().unwrap_or(tail);
            if !code.is_empty() {
                return Some(code);
            }
        }
    }
    None
}

/// Turn a `shortcode_media` node into raw items. Sidecar posts carry
/// their children under `edge_sidecar_to_children`; everything else
/// is a single node.
fn parse_shortcode_media(media: &Value, source_version: &'static str) -> Extraction {
    let mut extraction = Extraction::new(source_version);

    extraction.title = media
        .get("edge_media_to_caption")
        .and_then(|c| c.get("edges"))
        .and_then(|e| e.get(0))
        .and_then(|e| e.get("node"))
        .and_then(|n| str_field(n, "text"))
        .unwrap_or_default()
        .to_string();
    extraction.thumbnail = str_field(media, "display_url").unwrap_or_default().to_string();

    let children: Vec<&Value> = media
        .get("edge_sidecar_to_children")
        .and_then(|s| s.get("edges"))
        .and_then(Value::as_array)
        .map(|edges| edges.iter().filter_map(|e| e.get("node")).collect())
        .unwrap_or_else(|| vec![media]);

    for node in children {
        let is_video = node
            .get("is_video")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let url = if is_video {
            str_field(node, "video_url").or_else(|| str_field(node, "display_url"))
        } else {
            str_field(node, "display_url")
        };
        let Some(url) = url else { continue };

        extraction
            .items
            .push(RawMediaItem::new(url).renderable_video(is_video));
    }

    extraction
}

/// v1: web JSON rendition.
pub struct InstagramWebJson {
    provider: ProviderClient,
}

impl InstagramWebJson {
    pub fn new(client: Client) -> Self {
        let mut provider = ProviderClient::new("Instagram", client);
        provider.set_referer_static("https://www.instagram.com/");
        // The web tier rejects requests without the app id.
        provider.add_header_str("x-ig-app-id", "936619743392459");
        Self { provider }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        let media = payload
            .get("graphql")
            .and_then(|g| g.get("shortcode_media"))
            .or_else(|| payload.get("items").and_then(|i| i.get(0)))
            .ok_or_else(|| ResolveError::BadPayload("web json: no media node".into()))?;

        Ok(parse_shortcode_media(media, "instagram-v1"))
    }
}

#[async_trait]
impl ProviderAdapter for InstagramWebJson {
    fn source_version(&self) -> &'static str {
        "instagram-v1"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let base = url.split(['?', '#']).next().unwrap_or(url);
        let payload: Value = self
            .provider
            .get(base)
            .query(&[("__a", "1"), ("__d", "dis")])
            .send()
            .await?
            .json()
            .await?;

        self.parse_response(&payload)
    }
}

/// v2: GraphQL query endpoint. Uses the credential pair's
/// authenticated tier when configured.
pub struct InstagramGraphql {
    provider: ProviderClient,
}

impl InstagramGraphql {
    pub fn new(client: Client, creds: Option<&ProviderCredentials>) -> Self {
        let mut provider = ProviderClient::new("Instagram", client);
        provider.set_referer_static("https://www.instagram.com/");
        if let Some(creds) = creds {
            provider.authenticate(creds);
        }
        Self { provider }
    }

    pub(crate) fn parse_response(&self, payload: &Value) -> Result<Extraction, ResolveError> {
        let media = payload
            .get("data")
            .and_then(|d| d.get("shortcode_media"))
            .ok_or_else(|| ResolveError::BadPayload("graphql: no media node".into()))?;

        Ok(parse_shortcode_media(media, "instagram-v2"))
    }
}

#[async_trait]
impl ProviderAdapter for InstagramGraphql {
    fn source_version(&self) -> &'static str {
        "instagram-v2"
    }

    async fn extract(&self, url: &str) -> Result<Extraction, ResolveError> {
        let code = shortcode(url)
            .ok_or_else(|| ResolveError::InvalidUrl(format!("no shortcode in {url}")))?;

        let variables = format!("{{\"shortcode\":\"{code}\"}}");
        let payload: Value = self
            .provider
            .get(GRAPHQL_API)
            .query(&[
                ("query_hash", SHORTCODE_MEDIA_QUERY_HASH),
                ("variables", variables.as_str()),
            ])
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
    fn shortcode_extraction() {
        assert_eq!(
            shortcode("https://www.instagram.com/p/Cabc123/?igsh=x"),
            Some("Cabc123")
        );
        assert_eq!(shortcode("https://www.instagram.com/reel/Cdef/"), Some("Cdef"));
        assert_eq!(shortcode("https://www.instagram.com/someuser"), None);
    }

    #[test]
    fn single_video_post() {
        let adapter = InstagramWebJson::new(Client::new());
        let payload = json!({
            "graphql": {"shortcode_media": {
                "is_video": true,
                "video_url": "https://scontent.cdninstagram.com/v1.mp4",
                "display_url": "https://scontent.cdninstagram.com/c.jpg",
                "edge_media_to_caption": {"edges": [{"node": {"text": "caption"}}]}
            }}
        });

        let extraction = adapter.parse_response(&payload).unwrap();
        assert_eq!(extraction.title, "caption");
        assert_eq!(extraction.thumbnail, "https://scontent.cdninstagram.com/c.jpg");
        assert_eq!(extraction.items.len(), 1);
        assert!(extraction.items[0].renderable_video);
        assert_eq!(extraction.items[0].url, "https://scontent.cdninstagram.com/v1.mp4");
    }

    #[test]
    fn sidecar_post_mixes_videos_and_photos() {
        let adapter = InstagramGraphql::new(Client::new(), None);
        let payload = json!({
            "data": {"shortcode_media": {
                "display_url": "https://scontent.cdninstagram.com/cover.jpg",
                "edge_sidecar_to_children": {"edges": [
                    {"node": {"is_video": false,
                              "display_url": "https://scontent.cdninstagram.com/1.jpg"}},
                    {"node": {"is_video": true,
                              "video_url": "https://scontent.cdninstagram.com/2.mp4",
                              "display_url": "https://scontent.cdninstagram.com/2.jpg"}},
                    {"node": {"is_video": false}}
                ]}
            }}
        });

        let extraction = adapter.parse_response(&payload).unwrap();
        assert_eq!(extraction.items.len(), 2, "node without any url must be dropped");
        assert!(!extraction.items[0].renderable_video);
        assert!(extraction.items[1].renderable_video);
    }

    #[test]
    fn login_wall_payload_is_rejected() {
        let adapter = InstagramWebJson::new(Client::new());
        // What the endpoint returns for private posts / logged-out
        // sessions: a shell without the media node.
        let payload = json!({"require_login": true});
        assert!(matches!(
            adapter.parse_response(&payload),
            Err(ResolveError::BadPayload(_))
        ));
    }
}
