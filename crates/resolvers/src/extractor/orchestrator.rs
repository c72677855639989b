//! Sequential fallback over a platform's ordered adapter list.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use super::error::ResolveError;
use super::provider::ProviderAdapter;
use crate::media::Extraction;

/// Upper bound on a single adapter call. Metadata extraction is
/// short-lived; anything slower is treated as a failed attempt so the
/// chain can move on.
pub const ADAPTER_TIMEOUT: Duration = Duration::from_secs(20);

/// Drives a platform's adapters in order and stops at the first
/// usable result.
///
/// The ordering is a design decision, not an optimization: adapters
/// are listed by historical reliability, and once one succeeds the
/// rest never run even if a later one might return a larger set.
/// Adapters run sequentially on purpose — speculative concurrent
/// calls would burn upstream quota and invite shared rate limits.
pub struct Orchestrator {
    adapters: Vec<Box<dyn ProviderAdapter>>,
}

impl Orchestrator {
    pub fn new(adapters: Vec<Box<dyn ProviderAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Resolve a canonical URL through the fallback chain.
    ///
    /// A success with zero items counts as a failure: the invariant
    /// downstream is that resolutions are never empty.
    pub async fn resolve(&self, url: &str) -> Result<Extraction, ResolveError> {
        for adapter in &self.adapters {
            let version = adapter.source_version();
            debug!(provider = version, url, "Trying provider");

            match timeout(ADAPTER_TIMEOUT, adapter.extract(url)).await {
                Ok(Ok(extraction)) if !extraction.items.is_empty() => {
                    debug!(
                        provider = version,
                        items = extraction.items.len(),
                        "Provider succeeded"
                    );
                    return Ok(extraction);
                }
                Ok(Ok(_)) => {
                    warn!(provider = version, "Provider returned no media items; trying next");
                }
                Ok(Err(error)) => {
                    warn!(provider = version, error = %error, "Provider failed; trying next");
                }
                Err(_) => {
                    warn!(provider = version, "Provider timed out; trying next");
                }
            }
        }

        Err(ResolveError::NoMediaFound)
    }
}
