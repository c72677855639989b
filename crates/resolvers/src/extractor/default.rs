//! Default HTTP client and the per-platform adapter registry.

use reqwest::Client;
use std::time::Duration;

use super::provider::{ProviderAdapter, ProviderCredentials};
use super::providers::{
    facebook::{FacebookBasic, FacebookPage},
    instagram::{InstagramGraphql, InstagramWebJson},
    tiktok::{TikTokFeed, TikTokTikwm},
    twitter::{TwitterSyndication, TwitterVx},
    youtube::{YoutubeInnertube, YoutubePiped},
};
use crate::classifier::PlatformTag;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Client used for metadata extraction calls. The request timeout
/// here bounds a single provider call; the orchestrator adds its own
/// per-adapter ceiling on top.
pub fn default_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

/// Ordered adapter chain for a platform.
///
/// Order encodes historical reliability per platform and is the only
/// thing that changes when a provider dies or a new one is adopted —
/// adding/removing/reordering adapters is a data change here, not a
/// code change in the orchestrator.
pub fn adapter_chain(
    tag: PlatformTag,
    client: &Client,
    creds: Option<&ProviderCredentials>,
) -> Vec<Box<dyn ProviderAdapter>> {
    match tag {
        PlatformTag::VideoHost => vec![
            Box::new(YoutubeInnertube::new(client.clone())),
            Box::new(YoutubePiped::new(client.clone())),
        ],
        PlatformTag::PhotoHost => vec![
            Box::new(InstagramWebJson::new(client.clone())),
            Box::new(InstagramGraphql::new(client.clone(), creds)),
        ],
        PlatformTag::MicroblogHost => vec![
            Box::new(TwitterSyndication::new(client.clone())),
            Box::new(TwitterVx::new(client.clone())),
        ],
        PlatformTag::ShortVideoHost => vec![
            Box::new(TikTokTikwm::new(client.clone())),
            Box::new(TikTokFeed::new(client.clone())),
            // Reels resolve through the same page markers as regular
            // Facebook video.
            Box::new(FacebookPage::new(client.clone())),
        ],
        PlatformTag::GenericHost => vec![
            Box::new(FacebookPage::new(client.clone())),
            Box::new(FacebookBasic::new(client.clone())),
        ],
        PlatformTag::DirectMedia | PlatformTag::Unknown => Vec::new(),
    }
}
