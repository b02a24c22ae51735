//! Render the normalized snapshot into the sandboxed preview surface.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info_span, Instrument};

use dm_core::ports::PreviewSurfacePort;
use dm_core::{normalize_html, AssetOrigin, SandboxPolicy, Snapshot};

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("No preview available")]
    EmptySnapshot,

    #[error("preview surface failed: {0}")]
    Surface(String),
}

/// What the preview surface was handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPreview {
    pub html: String,
    pub sandbox: SandboxPolicy,
}

pub struct RenderPreviewUseCase {
    surface: Arc<dyn PreviewSurfacePort>,
    /// Grace period for images inside the preview to load before it is
    /// reported ready.
    settle: Duration,
}

impl RenderPreviewUseCase {
    pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

    pub fn new(surface: Arc<dyn PreviewSurfacePort>, settle: Duration) -> Self {
        Self { surface, settle }
    }

    pub async fn execute(
        &self,
        snapshot: &Snapshot,
        origin: &AssetOrigin,
    ) -> Result<RenderedPreview, PreviewError> {
        let span = info_span!(
            "usecase.render_preview.execute",
            snapshot_len = snapshot.len(),
            origin = %origin
        );

        async {
            if snapshot.is_blank() {
                return Err(PreviewError::EmptySnapshot);
            }

            let html = normalize_html(snapshot.as_str(), origin);
            let sandbox = SandboxPolicy::preview();
            self.surface
                .render(&html, &sandbox)
                .await
                .map_err(|err| PreviewError::Surface(format!("{err:#}")))?;

            sleep(self.settle).await;
            debug!(sandbox = %sandbox, "Preview ready");
            Ok(RenderedPreview { html, sandbox })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSurface {
        rendered: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl PreviewSurfacePort for RecordingSurface {
        async fn render(&self, html: &str, sandbox: &SandboxPolicy) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("surface closed");
            }
            self.rendered
                .lock()
                .unwrap()
                .push((html.to_string(), sandbox.to_string()));
            Ok(())
        }

        async fn print(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_normalized_html_with_sandbox() {
        let surface = Arc::new(RecordingSurface::default());
        let uc = RenderPreviewUseCase::new(surface.clone(), RenderPreviewUseCase::DEFAULT_SETTLE);
        let snapshot = Snapshot::from(r#"<img src="file:///apps/Static/photos/a.png">"#);

        let preview = uc
            .execute(&snapshot, &AssetOrigin::new("https://cdn.x"))
            .await
            .unwrap();

        assert_eq!(preview.html, r#"<img src="https://cdn.x/static/photos/a.png">"#);
        let rendered = surface.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].1, "allow-same-origin allow-scripts allow-forms");
        // the caller's snapshot is untouched
        assert!(snapshot.as_str().contains("file:///"));
    }

    #[tokio::test]
    async fn test_blank_snapshot_has_no_preview() {
        let surface = Arc::new(RecordingSurface::default());
        let uc = RenderPreviewUseCase::new(surface.clone(), Duration::ZERO);

        let err = uc
            .execute(&Snapshot::from(""), &AssetOrigin::new("https://cdn.x"))
            .await
            .unwrap_err();

        assert!(matches!(err, PreviewError::EmptySnapshot));
        assert_eq!(err.to_string(), "No preview available");
        assert!(surface.rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_surface_failure_is_reported() {
        let surface = Arc::new(RecordingSurface {
            fail: true,
            ..Default::default()
        });
        let uc = RenderPreviewUseCase::new(surface, Duration::ZERO);

        let err = uc
            .execute(&Snapshot::from("<p>x</p>"), &AssetOrigin::new("https://cdn.x"))
            .await
            .unwrap_err();

        assert!(matches!(err, PreviewError::Surface(_)));
    }
}
