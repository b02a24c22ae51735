use anyhow::Result;

use crate::document::{FetchedAsset, MaterializedAsset};

/// Off-screen raster surface: decode, draw at natural size, serialize to a
/// data URI.
/// 离屏栅格面：解码、按原始尺寸绘制并序列化为 data URI。
#[async_trait::async_trait]
pub trait RasterSurfacePort: Send + Sync {
    async fn draw(&self, asset: &FetchedAsset) -> Result<MaterializedAsset>;
}
