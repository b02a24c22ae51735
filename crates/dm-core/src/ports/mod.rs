//! Port interfaces for the application layer
//!
//! Ports define the contract between the pipeline use cases and the
//! collaborators they drive: the asset server, the off-screen raster
//! surface, the live DOM subtree, the rasterization backend, the save-to-disk
//! trigger, the preview surface and the caller's notification channel.
//! 端口定义用例与外部协作者之间的契约。

mod asset_fetcher;
mod notifier;
mod preview_surface;
mod raster_surface;
mod rasterizer;
mod saver;
mod subtree;

pub use asset_fetcher::AssetFetcherPort;
pub use notifier::NotifierPort;
pub use preview_surface::PreviewSurfacePort;
pub use raster_surface::RasterSurfacePort;
pub use rasterizer::RasterizerPort;
pub use saver::DocumentSaverPort;
pub use subtree::{ImageElementPort, RenderedSubtreePort};
