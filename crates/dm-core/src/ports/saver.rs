use std::path::PathBuf;

use anyhow::Result;

/// Same-device save-to-disk trigger.
#[async_trait::async_trait]
pub trait DocumentSaverPort: Send + Sync {
    /// Persist `bytes` under `filename`; returns where the file landed.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}
