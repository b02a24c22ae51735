//! # Pipeline Dependencies / 管线依赖
//!
//! Groups the ports a [`DocumentSession`](crate::DocumentSession) is built
//! from.
//!
//! **Note / 注意**: This is NOT a Builder pattern, just parameter grouping.
//! **这不是 Builder 模式，仅用于参数打包。**

use std::sync::Arc;
use std::time::Duration;

use dm_core::ports::*;

use crate::usecases::MaterializerTiming;

/// All dependencies are required - no defaults, no optional fields.
/// 所有依赖都是必需的 - 无默认值，无可选字段。
#[derive(Clone)]
pub struct PipelineDeps {
    // Materialization / 物化
    pub fetcher: Arc<dyn AssetFetcherPort>,
    pub raster_surface: Arc<dyn RasterSurfacePort>,
    pub timing: MaterializerTiming,

    // Export / 导出
    pub rasterizer: Arc<dyn RasterizerPort>,
    pub saver: Arc<dyn DocumentSaverPort>,
    pub notifier: Arc<dyn NotifierPort>,

    // Preview / 预览
    pub preview_surface: Arc<dyn PreviewSurfacePort>,
    pub preview_settle: Duration,
}
