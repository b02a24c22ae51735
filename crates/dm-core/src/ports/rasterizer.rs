use anyhow::Result;

use crate::export::RasterizeOptions;
use crate::ports::RenderedSubtreePort;

/// Rasterize-and-paginate backend.
///
/// Returns the complete binary document or an error; never a partial result.
#[async_trait::async_trait]
pub trait RasterizerPort: Send + Sync {
    async fn rasterize(
        &self,
        subtree: &dyn RenderedSubtreePort,
        options: &RasterizeOptions,
    ) -> Result<Vec<u8>>;
}
