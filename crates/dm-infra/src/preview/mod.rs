mod file_preview_surface;

pub use file_preview_surface::FilePreviewSurface;
