//! # dm-infra
//!
//! Adapters implementing the `dm-core` ports against real infrastructure:
//! HTTP, image codecs, external commands and the filesystem.

pub mod config;
pub mod export;
pub mod fetch;
pub mod fs;
pub mod markup;
pub mod preview;
pub mod raster;

pub use config::MaterializerSettings;
pub use export::CommandRasterizer;
pub use fetch::HttpAssetFetcher;
pub use fs::FsDocumentSaver;
pub use markup::{LoadState, MarkupDocument, MarkupImage};
pub use preview::FilePreviewSurface;
pub use raster::PngRasterSurface;
