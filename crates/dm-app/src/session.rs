//! Preview/export session.
//! 预览/导出会话。
//!
//! A session is opened per snapshot and owns everything whose lifetime is tied
//! to that document: the zoom level, the preview state and the
//! materialization cache. Closing the session drops the cache, so assets of
//! one candidate's record can never leak into another document's export.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{info, warn};

use dm_core::materialize::MaterializationCache;
use dm_core::ports::PreviewSurfacePort;
use dm_core::preview::PreviewState;
use dm_core::{AssetOrigin, ExportJob, SessionId, Snapshot, SubtreeId, Zoom};

use crate::deps::PipelineDeps;
use crate::usecases::{
    ExportDocumentUseCase, ExportError, ExportSuccess, MaterializeAssetsUseCase, PreviewError,
    RenderPreviewUseCase, RenderedPreview,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session {0} is closed")]
    Closed(SessionId),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("print fallback failed: {0}")]
    Print(String),
}

pub struct DocumentSession {
    id: SessionId,
    snapshot: Snapshot,
    origin: AssetOrigin,
    cache: Arc<MaterializationCache>,
    zoom: Mutex<Zoom>,
    preview_state: watch::Sender<PreviewState>,
    closed: AtomicBool,
    preview: RenderPreviewUseCase,
    export: ExportDocumentUseCase,
    surface: Arc<dyn PreviewSurfacePort>,
}

impl DocumentSession {
    /// Open a session for `snapshot` with an empty cache.
    pub fn open(snapshot: Snapshot, origin: AssetOrigin, deps: PipelineDeps) -> Self {
        let materializer = Arc::new(MaterializeAssetsUseCase::new(
            deps.fetcher,
            deps.raster_surface,
            deps.timing,
        ));
        let export =
            ExportDocumentUseCase::new(materializer, deps.rasterizer, deps.saver, deps.notifier);
        let preview = RenderPreviewUseCase::new(deps.preview_surface.clone(), deps.preview_settle);
        let (preview_state, _) = watch::channel(PreviewState::Loading);

        let id = SessionId::new();
        info!(session = %id, origin = %origin, snapshot_len = snapshot.len(), "Session opened");

        Self {
            id,
            snapshot,
            origin,
            cache: Arc::new(MaterializationCache::new()),
            zoom: Mutex::new(Zoom::default()),
            preview_state,
            closed: AtomicBool::new(false),
            preview,
            export,
            surface: deps.preview_surface,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn origin(&self) -> &AssetOrigin {
        &self.origin
    }

    /// The session's materialization cache.
    pub fn cache(&self) -> &MaterializationCache {
        &self.cache
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed(self.id.clone()));
        }
        Ok(())
    }

    // ---- preview ----

    pub async fn render_preview(&self) -> Result<RenderedPreview, SessionError> {
        self.ensure_open()?;
        self.preview_state.send_replace(PreviewState::Loading);
        let result = self.preview.execute(&self.snapshot, &self.origin).await;
        if result.is_ok() {
            self.preview_state.send_replace(PreviewState::Ready);
        }
        Ok(result?)
    }

    pub fn preview_state(&self) -> PreviewState {
        *self.preview_state.borrow()
    }

    pub fn subscribe_preview_state(&self) -> watch::Receiver<PreviewState> {
        self.preview_state.subscribe()
    }

    pub fn zoom(&self) -> Zoom {
        *self.zoom.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn zoom_in(&self) -> Zoom {
        self.update_zoom(|z| {
            z.zoom_in();
        })
    }

    pub fn zoom_out(&self) -> Zoom {
        self.update_zoom(|z| {
            z.zoom_out();
        })
    }

    pub fn reset_zoom(&self) -> Zoom {
        self.update_zoom(|z| {
            z.reset();
        })
    }

    pub fn set_zoom(&self, percent: u16) -> Zoom {
        self.update_zoom(|z| {
            z.set(percent);
        })
    }

    fn update_zoom(&self, f: impl FnOnce(&mut Zoom)) -> Zoom {
        let mut zoom = self.zoom.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut zoom);
        *zoom
    }

    // ---- export ----

    pub async fn export(&self, job: &ExportJob) -> Result<ExportSuccess, SessionError> {
        self.ensure_open()?;
        Ok(self.export.execute(job, &self.cache).await?)
    }

    pub fn is_exporting(&self, subtree: &SubtreeId) -> bool {
        self.export.is_busy(subtree)
    }

    /// Native print on the rendered (normalized, possibly not materialized)
    /// preview surface.
    pub async fn print_fallback(&self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.surface.print().await.map_err(|err| {
            warn!(session = %self.id, error = %err, "Print fallback failed");
            SessionError::Print(format!("{err:#}"))
        })
    }

    /// Tear down: drop cached assets and reject further work.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let cached = self.cache.len().await;
        self.cache.clear().await;
        info!(session = %self.id, cached, "Session closed");
    }
}
