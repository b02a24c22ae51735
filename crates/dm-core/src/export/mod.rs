//! Export domain: jobs, rasterization contract, filenames and notifications.
//! 导出领域：任务、栅格化配置契约、文件名与通知。

mod filename;
mod job;
mod notification;
mod options;

pub use filename::{certificate_filename, form_filename, FormKind};
pub use job::ExportJob;
pub use notification::{ExportNotification, FallbackSuggestion, EXPORT_FAILED_MESSAGE};
pub use options::{
    CanvasOptions, ImageEncoding, ImageOptions, Orientation, PageFormat, PageOptions, PageUnit,
    RasterizeOptions,
};
