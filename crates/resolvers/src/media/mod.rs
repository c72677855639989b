pub mod media_format;
pub mod media_resolution;
pub mod raw;

pub use media_format::{MediaFormat, MediaKind};
pub use media_resolution::MediaResolution;
pub use raw::{Extraction, RawMediaItem};
