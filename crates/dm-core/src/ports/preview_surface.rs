use anyhow::Result;

use crate::preview::SandboxPolicy;

/// Isolated document context that displays the normalized snapshot.
/// 显示规范化快照的隔离文档上下文。
#[async_trait::async_trait]
pub trait PreviewSurfacePort: Send + Sync {
    async fn render(&self, html: &str, sandbox: &SandboxPolicy) -> Result<()>;

    /// Native print on whatever is currently rendered.
    async fn print(&self) -> Result<()>;
}
