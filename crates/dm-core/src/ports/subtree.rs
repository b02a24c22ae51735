use std::sync::Arc;

use anyhow::Result;

use crate::document::{MaterializedAsset, ResourceReference};
use crate::ids::SubtreeId;

/// One `<img>` element of a live, rendered subtree.
#[async_trait::async_trait]
pub trait ImageElementPort: Send + Sync {
    /// Current source attribute; `None` when absent.
    fn src(&self) -> Option<ResourceReference>;

    /// Overwrite the source attribute in place.
    fn set_src(&self, asset: &MaterializedAsset) -> Result<()>;

    /// Resolves once the element reports load completion. Load errors count as
    /// settled; already-loaded elements resolve immediately.
    async fn wait_settled(&self);
}

/// A DOM subtree that is attached and rendered (not a detached template).
/// 已挂载并渲染的 DOM 子树。
pub trait RenderedSubtreePort: Send + Sync {
    fn id(&self) -> &SubtreeId;

    /// Image elements in document order. Fails only when the subtree itself is
    /// gone.
    fn images(&self) -> Result<Vec<Arc<dyn ImageElementPort>>>;

    /// Serialized markup reflecting the current element sources.
    fn outer_html(&self) -> Result<String>;
}
