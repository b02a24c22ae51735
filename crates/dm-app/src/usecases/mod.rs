//! Pipeline use cases
//!
//! render preview:  Snapshot ─► normalize ─► PreviewSurface
//! export:          ExportJob ─► MaterializeAssets ─► Rasterizer ─► Saver ─► Notifier

pub mod export_document;
pub mod materialize_assets;
pub mod render_preview;

pub use export_document::{ExportDocumentUseCase, ExportError, ExportSuccess};
pub use materialize_assets::{MaterializeAssetsUseCase, MaterializeError, MaterializerTiming};
pub use render_preview::{PreviewError, RenderPreviewUseCase, RenderedPreview};
