//! docmat application orchestration layer
//!
//! This crate contains the pipeline use cases (preview, materialize, export)
//! and the session object that ties their lifetimes together.

pub mod deps;
pub mod session;
pub mod usecases;

pub use deps::PipelineDeps;
pub use session::{DocumentSession, SessionError};
pub use usecases::{
    ExportDocumentUseCase, ExportError, ExportSuccess, MaterializeAssetsUseCase, MaterializeError,
    MaterializerTiming, PreviewError, RenderPreviewUseCase, RenderedPreview,
};
