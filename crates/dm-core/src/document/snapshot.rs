use std::fmt;
use std::sync::Arc;

/// Immutable HTML markup of a document to preview or export.
/// 待预览或导出文档的不可变 HTML 快照。
///
/// The pipeline never mutates a snapshot; every transformation produces a
/// new string.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    pub fn new(html: impl Into<Arc<str>>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when there is nothing to render (blank or whitespace only).
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("len", &self.0.len())
            .finish()
    }
}

impl From<String> for Snapshot {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Snapshot {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
