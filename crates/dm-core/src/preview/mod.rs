//! Preview surface domain: zoom and sandbox capabilities.
//! 预览面领域：缩放与沙箱能力。

mod sandbox;
mod zoom;

pub use sandbox::{SandboxCapability, SandboxPolicy};
pub use zoom::Zoom;

/// Loading indicator state of the preview surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Loading,
    Ready,
}
