use std::io::Cursor;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{GenericImageView, ImageFormat};
use tokio::task::spawn_blocking;
use tracing::debug;

use dm_core::ports::RasterSurfacePort;
use dm_core::{FetchedAsset, MaterializedAsset};

/// Off-screen surface: decode the fetched bytes, draw them at natural size and
/// serialize the result as a PNG data URI.
pub struct PngRasterSurface;

impl PngRasterSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PngRasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RasterSurfacePort for PngRasterSurface {
    async fn draw(&self, asset: &FetchedAsset) -> Result<MaterializedAsset> {
        let bytes = asset.bytes.clone();
        let content_type = asset.content_type.clone();

        // decode and encode are CPU bound; keep them off the runtime threads
        let (png_bytes, width, height) =
            spawn_blocking(move || redraw_as_png(&bytes, content_type.as_deref()))
                .await
                .context("raster surface task failed")?
                .with_context(|| format!("draw {}", asset.reference))?;

        debug!(reference = %asset.reference, width, height, "Drew image to raster surface");
        Ok(MaterializedAsset::from_encoded("image/png", &png_bytes))
    }
}

/// Decode `bytes` (trusting the content type first, sniffing otherwise) and
/// re-encode them as an RGBA PNG of the same size.
fn redraw_as_png(bytes: &[u8], content_type: Option<&str>) -> Result<(Vec<u8>, u32, u32)> {
    let decoded = match content_type.and_then(ImageFormat::from_mime_type) {
        Some(format) => image::load_from_memory_with_format(bytes, format)
            .or_else(|_| image::load_from_memory(bytes)),
        None => image::load_from_memory(bytes),
    }
    .context("decode image bytes")?;

    let (width, height) = decoded.dimensions();
    let rgba = image::DynamicImage::ImageRgba8(decoded.to_rgba8());

    let mut png_bytes = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .context("encode raster surface to png")?;
    Ok((png_bytes, width, height))
}
