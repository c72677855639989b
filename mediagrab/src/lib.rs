//! Media resolution and streaming proxy server.
//!
//! Exposes two main surfaces: `/api/resolve`, which turns a social
//! post URL into a set of downloadable media formats, and
//! `/api/proxy`, which streams a CDN asset through with browser-like
//! headers so anti-hotlink checks pass.

pub mod api;
pub mod error;
pub mod logging;
