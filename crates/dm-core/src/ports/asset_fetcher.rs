use anyhow::Result;

use crate::document::{FetchedAsset, ResourceReference};

/// Fetches image bytes through a credentialed channel.
///
/// Implementations must treat non-success responses as errors; the
/// materializer downgrades them to a per-image skip.
#[async_trait::async_trait]
pub trait AssetFetcherPort: Send + Sync {
    async fn fetch(&self, reference: &ResourceReference) -> Result<FetchedAsset>;
}
