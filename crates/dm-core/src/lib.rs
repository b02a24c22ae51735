//! # dm-core
//!
//! Core domain models and ports for the document materialization and export
//! pipeline.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! the URL normalizer, the session materialization cache, preview zoom, the
//! export job contract and the port traits implemented by `dm-infra`.

pub mod config;
pub mod document;
pub mod export;
pub mod ids;
pub mod materialize;
pub mod normalize;
pub mod ports;
pub mod preview;

// Re-export commonly used types at the crate root
pub use config::PipelineConfig;
pub use document::{FetchedAsset, MaterializedAsset, ResourceReference, Snapshot};
pub use export::{ExportJob, ExportNotification, FallbackSuggestion, RasterizeOptions};
pub use ids::{JobId, SessionId, SubtreeId};
pub use materialize::{MaterializationCache, MaterializationReport};
pub use normalize::{normalize_html, AssetOrigin};
pub use preview::{SandboxPolicy, Zoom};
