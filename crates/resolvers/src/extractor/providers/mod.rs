//! One module per platform; each holds that platform's provider
//! adapters in version order.

pub mod facebook;
pub mod instagram;
pub mod tiktok;
pub mod twitter;
pub mod youtube;
