//! Resolution of social-media post URLs into downloadable media assets.
//!
//! The crate is split the same way the resolution pipeline runs:
//! [`classifier`] maps an input URL to a platform tag, [`extractor`]
//! drives an ordered chain of provider adapters for that platform,
//! and [`normalizer`] turns the winning adapter's raw items into the
//! uniform [`media::MediaFormat`] shape.

pub mod classifier;
pub mod extractor;
pub mod media;
pub mod normalizer;

pub use classifier::{PlatformTag, classify, is_valid_url};
pub use extractor::error::ResolveError;
pub use extractor::resolve_media;
pub use media::{MediaFormat, MediaKind, MediaResolution};
