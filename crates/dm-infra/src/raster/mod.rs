mod png_raster_surface;

pub use png_raster_surface::PngRasterSurface;
