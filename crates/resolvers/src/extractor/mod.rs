pub mod default;
pub mod error;
pub mod orchestrator;
pub mod provider;
pub mod providers;
mod utils;

pub use default::{adapter_chain, default_client};
pub use orchestrator::Orchestrator;
pub use provider::{ProviderAdapter, ProviderClient, ProviderCredentials};

use reqwest::Client;
use tracing::debug;

use crate::classifier::PlatformTag;
use crate::media::{MediaFormat, MediaKind, MediaResolution};
use crate::normalizer;
use error::ResolveError;

/// Expand a bare post id into the platform's canonical URL.
pub fn canonical_url_for_id(tag: PlatformTag, id: &str) -> Option<String> {
    match tag {
        PlatformTag::VideoHost => Some(format!("https://www.youtube.com/watch?v={id}")),
        PlatformTag::ShortVideoHost => Some(format!("https://www.tiktok.com/@i/video/{id}")),
        PlatformTag::PhotoHost => Some(format!("https://www.instagram.com/p/{id}/")),
        PlatformTag::MicroblogHost => Some(format!("https://twitter.com/i/status/{id}")),
        PlatformTag::GenericHost => Some(format!("https://www.facebook.com/watch/?v={id}")),
        PlatformTag::DirectMedia | PlatformTag::Unknown => None,
    }
}

fn direct_resolution(url: &str) -> Result<MediaResolution, ResolveError> {
    let kind = if normalizer::has_image_extension(url) {
        MediaKind::Image
    } else {
        // Same default-to-video assumption the normalizer applies.
        MediaKind::Video
    };

    let title = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("media")
        .to_string();
    let thumbnail = if kind == MediaKind::Image {
        url.to_string()
    } else {
        String::new()
    };

    let format = MediaFormat {
        quality: "Original".to_string(),
        url: url.to_string(),
        kind,
        size_bytes: None,
    };

    MediaResolution::from_formats(title, thumbnail, vec![format])
        .ok_or(ResolveError::NoMediaFound)
}

/// Resolve a canonical post URL into downloadable formats.
///
/// Direct-media URLs bypass extraction entirely: the input is the
/// asset. Everything else runs the platform's fallback chain and the
/// winning extraction through normalization. A run that normalizes to
/// zero usable formats is a [`ResolveError::NoMediaFound`], never a
/// success with an empty list.
pub async fn resolve_media(
    tag: PlatformTag,
    url: &str,
    client: &Client,
    creds: Option<&ProviderCredentials>,
) -> Result<MediaResolution, ResolveError> {
    if tag == PlatformTag::DirectMedia {
        return direct_resolution(url);
    }

    let orchestrator = Orchestrator::new(adapter_chain(tag, client, creds));
    if orchestrator.is_empty() {
        return Err(ResolveError::UnsupportedPlatform);
    }

    let extraction = orchestrator.resolve(url).await?;
    debug!(
        source = extraction.source_version,
        items = extraction.items.len(),
        "Normalizing extraction"
    );

    let formats = normalizer::normalize(tag, &extraction.items);
    MediaResolution::from_formats(extraction.title, extraction.thumbnail, formats)
        .ok_or(ResolveError::NoMediaFound)
}
