use std::fmt;
use std::sync::Arc;

use super::RasterizeOptions;
use crate::ids::{JobId, SubtreeId};
use crate::ports::RenderedSubtreePort;

/// One export invocation: what to rasterize, where to save it, and how.
/// 一次导出调用：栅格化目标、保存文件名与选项。
///
/// Created when export is requested, dropped once the binary is delivered or
/// the attempt fails.
#[derive(Clone)]
pub struct ExportJob {
    pub id: JobId,
    pub subtree: Arc<dyn RenderedSubtreePort>,
    pub filename: String,
    pub options: RasterizeOptions,
}

impl ExportJob {
    pub fn new(subtree: Arc<dyn RenderedSubtreePort>, filename: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            subtree,
            filename: filename.into(),
            options: RasterizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RasterizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn subtree_id(&self) -> &SubtreeId {
        self.subtree.id()
    }
}

impl fmt::Debug for ExportJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportJob")
            .field("id", &self.id)
            .field("subtree", self.subtree.id())
            .field("filename", &self.filename)
            .field("options", &self.options)
            .finish()
    }
}
