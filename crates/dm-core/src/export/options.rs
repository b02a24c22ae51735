//! Fixed configuration contract handed to the rasterization backend.

use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Jpeg,
    Png,
}

impl ImageEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "jpeg",
            ImageEncoding::Png => "png",
        }
    }
}

/// Compression of page images inside the output document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOptions {
    pub encoding: ImageEncoding,
    /// 0.0 – 1.0
    pub quality: f32,
}

/// Canvas rasterization flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasOptions {
    /// Device pixel scale for crispness.
    pub scale: f32,
    pub use_cors: bool,
    pub allow_taint: bool,
    pub logging: bool,
    pub background_color: String,
    #[serde(with = "millis")]
    pub image_timeout: Duration,
    pub remove_container: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageUnit {
    In,
    Mm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    /// Portrait width and height in inches.
    pub fn size_in_inches(&self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (8.27, 11.69),
            PageFormat::Letter => (8.5, 11.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::Letter => "Letter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageOptions {
    pub unit: PageUnit,
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PageOptions {
    /// Page width and height in inches for the configured orientation.
    pub fn size_in_inches(&self) -> (f32, f32) {
        let (w, h) = self.format.size_in_inches();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Rasterization options for one export.
/// 单次导出的栅格化选项。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterizeOptions {
    /// Uniform page margin, in `page.unit`.
    pub margin: f32,
    pub image: ImageOptions,
    pub canvas: CanvasOptions,
    pub page: PageOptions,
}

impl RasterizeOptions {
    /// Margin converted to millimetres.
    pub fn margin_mm(&self) -> f32 {
        match self.page.unit {
            PageUnit::In => self.margin * 25.4,
            PageUnit::Mm => self.margin,
        }
    }

    /// Printable width and height in inches (page minus margins on both sides).
    pub fn content_area_in_inches(&self) -> (f32, f32) {
        let (w, h) = self.page.size_in_inches();
        let margin_in = self.margin_mm() / 25.4;
        ((w - 2.0 * margin_in).max(0.0), (h - 2.0 * margin_in).max(0.0))
    }
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        Self {
            margin: 0.5,
            image: ImageOptions {
                encoding: ImageEncoding::Jpeg,
                quality: 0.98,
            },
            canvas: CanvasOptions {
                scale: 2.0,
                use_cors: true,
                allow_taint: true,
                logging: false,
                background_color: "#ffffff".to_string(),
                image_timeout: Duration::from_millis(15_000),
                remove_container: true,
            },
            page: PageOptions {
                unit: PageUnit::In,
                format: PageFormat::A4,
                orientation: Orientation::Portrait,
            },
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_contract() {
        let options = RasterizeOptions::default();
        assert_eq!(options.margin, 0.5);
        assert_eq!(options.image.encoding, ImageEncoding::Jpeg);
        assert_eq!(options.image.quality, 0.98);
        assert_eq!(options.canvas.scale, 2.0);
        assert!(options.canvas.use_cors);
        assert!(options.canvas.allow_taint);
        assert_eq!(options.page.format, PageFormat::A4);
        assert_eq!(options.page.orientation, Orientation::Portrait);
    }

    #[test]
    fn test_margin_in_millimetres() {
        let options = RasterizeOptions::default();
        assert!((options.margin_mm() - 12.7).abs() < 1e-4);
    }

    #[test]
    fn test_landscape_swaps_page_size() {
        let mut options = RasterizeOptions::default();
        options.page.orientation = Orientation::Landscape;
        assert_eq!(options.page.size_in_inches(), (11.69, 8.27));
    }

    #[test]
    fn test_content_area_subtracts_margins() {
        let (w, h) = RasterizeOptions::default().content_area_in_inches();
        assert!((w - 7.27).abs() < 1e-3);
        assert!((h - 10.69).abs() < 1e-3);
    }

    #[test]
    fn test_serializes_timeout_as_millis() {
        let json = serde_json::to_value(RasterizeOptions::default()).unwrap();
        assert_eq!(json["canvas"]["image_timeout"], 15_000);
        assert_eq!(json["page"]["format"], "a4");
    }
}
