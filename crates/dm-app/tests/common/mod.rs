//! In-memory fakes for the pipeline ports.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use dm_app::{MaterializerTiming, PipelineDeps};
use dm_core::ports::*;
use dm_core::{
    ExportNotification, FetchedAsset, MaterializedAsset, RasterizeOptions, ResourceReference,
    SandboxPolicy, SubtreeId,
};

static TRACE_INIT: Once = Once::new();

/// Route use-case logs to the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    TRACE_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\ntrailer\n%%EOF\n";

// ---------------------------------------------------------------------------
// Subtree
// ---------------------------------------------------------------------------

pub struct FakeImage {
    src: Mutex<Option<String>>,
    swaps: AtomicUsize,
    loaded: Notify,
    settled: AtomicBool,
}

impl FakeImage {
    /// Already loaded.
    pub fn new(src: &str) -> Arc<Self> {
        Arc::new(Self {
            src: Mutex::new(Some(src.to_string())),
            swaps: AtomicUsize::new(0),
            loaded: Notify::new(),
            settled: AtomicBool::new(true),
        })
    }

    /// Still loading until [`FakeImage::finish_loading`] is called.
    pub fn loading(src: &str) -> Arc<Self> {
        let image = Self::new(src);
        image.settled.store(false, Ordering::SeqCst);
        image
    }

    pub fn without_src() -> Arc<Self> {
        let image = Self::new("");
        *image.src.lock().unwrap() = None;
        image
    }

    pub fn finish_loading(&self) {
        self.settled.store(true, Ordering::SeqCst);
        self.loaded.notify_waiters();
    }

    pub fn current_src(&self) -> Option<String> {
        self.src.lock().unwrap().clone()
    }

    pub fn swaps(&self) -> usize {
        self.swaps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageElementPort for FakeImage {
    fn src(&self) -> Option<ResourceReference> {
        self.current_src().map(ResourceReference::from)
    }

    fn set_src(&self, asset: &MaterializedAsset) -> anyhow::Result<()> {
        *self.src.lock().unwrap() = Some(asset.as_str().to_string());
        self.swaps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_settled(&self) {
        let notified = self.loaded.notified();
        if self.settled.load(Ordering::SeqCst) {
            return;
        }
        notified.await;
    }
}

pub struct FakeSubtree {
    id: SubtreeId,
    pub images: Vec<Arc<FakeImage>>,
    detached: AtomicBool,
}

impl FakeSubtree {
    pub fn new(id: &str, images: Vec<Arc<FakeImage>>) -> Arc<Self> {
        Arc::new(Self {
            id: SubtreeId::from(id),
            images,
            detached: AtomicBool::new(false),
        })
    }

    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }
}

impl RenderedSubtreePort for FakeSubtree {
    fn id(&self) -> &SubtreeId {
        &self.id
    }

    fn images(&self) -> anyhow::Result<Vec<Arc<dyn ImageElementPort>>> {
        if self.detached.load(Ordering::SeqCst) {
            anyhow::bail!("subtree {} is no longer attached", self.id);
        }
        Ok(self
            .images
            .iter()
            .map(|image| Arc::clone(image) as Arc<dyn ImageElementPort>)
            .collect())
    }

    fn outer_html(&self) -> anyhow::Result<String> {
        let body: String = self
            .images
            .iter()
            .map(|image| format!(r#"<img src="{}">"#, image.current_src().unwrap_or_default()))
            .collect();
        Ok(format!(r#"<div id="{}">{body}</div>"#, self.id))
    }
}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

/// Serves `bytes-of:<reference>`; references containing `404` fail.
pub struct CountingFetcher {
    calls: Mutex<HashMap<String, usize>>,
    latency: Duration,
}

impl CountingFetcher {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::from_millis(50))
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(HashMap::new()),
            latency,
        })
    }

    pub fn calls_for(&self, reference: &str) -> usize {
        self.calls.lock().unwrap().get(reference).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl AssetFetcherPort for CountingFetcher {
    async fn fetch(&self, reference: &ResourceReference) -> anyhow::Result<FetchedAsset> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(reference.as_str().to_string())
            .or_default() += 1;
        tokio::time::sleep(self.latency).await;

        if reference.as_str().contains("404") {
            anyhow::bail!("GET {reference}: 404 Not Found");
        }
        Ok(FetchedAsset::new(
            reference.clone(),
            Some("image/png".to_string()),
            format!("bytes-of:{reference}").into_bytes(),
        ))
    }
}

/// Encodes the fetched bytes as-is.
pub struct EchoSurface;

#[async_trait]
impl RasterSurfacePort for EchoSurface {
    async fn draw(&self, asset: &FetchedAsset) -> anyhow::Result<MaterializedAsset> {
        Ok(MaterializedAsset::from_encoded("image/png", &asset.bytes))
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RasterMode {
    Pdf,
    Fail,
    Truncated,
}

pub struct FakeRasterizer {
    mode: RasterMode,
    latency: Duration,
    seen: Mutex<Vec<String>>,
}

impl FakeRasterizer {
    pub fn new(mode: RasterMode) -> Arc<Self> {
        Self::with_latency(mode, Duration::ZERO)
    }

    pub fn with_latency(mode: RasterMode, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            mode,
            latency,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Markup of every subtree handed to the rasterizer.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RasterizerPort for FakeRasterizer {
    async fn rasterize(
        &self,
        subtree: &dyn RenderedSubtreePort,
        _options: &RasterizeOptions,
    ) -> anyhow::Result<Vec<u8>> {
        self.seen.lock().unwrap().push(subtree.outer_html()?);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.mode {
            RasterMode::Pdf => Ok(PDF_BYTES.to_vec()),
            RasterMode::Fail => anyhow::bail!("canvas is tainted"),
            RasterMode::Truncated => Ok(PDF_BYTES[..PDF_BYTES.len() / 2].to_vec()),
        }
    }
}

#[derive(Default)]
pub struct MemorySaver {
    pub saved: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl DocumentSaverPort for MemorySaver {
    async fn save(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/downloads").join(filename))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<ExportNotification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<ExportNotification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl NotifierPort for RecordingNotifier {
    fn notify(&self, notification: &ExportNotification) {
        self.notifications.lock().unwrap().push(notification.clone());
    }
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingPreview {
    pub rendered: Mutex<Vec<String>>,
    pub prints: AtomicUsize,
}

#[async_trait]
impl PreviewSurfacePort for RecordingPreview {
    async fn render(&self, html: &str, _sandbox: &SandboxPolicy) -> anyhow::Result<()> {
        self.rendered.lock().unwrap().push(html.to_string());
        Ok(())
    }

    async fn print(&self) -> anyhow::Result<()> {
        self.prints.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Fakes {
    pub fetcher: Arc<CountingFetcher>,
    pub rasterizer: Arc<FakeRasterizer>,
    pub saver: Arc<MemorySaver>,
    pub notifier: Arc<RecordingNotifier>,
    pub preview: Arc<RecordingPreview>,
}

impl Fakes {
    pub fn new(mode: RasterMode) -> Self {
        init_tracing();
        Self {
            fetcher: CountingFetcher::new(),
            rasterizer: FakeRasterizer::new(mode),
            saver: Arc::new(MemorySaver::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            preview: Arc::new(RecordingPreview::default()),
        }
    }

    pub fn deps(&self) -> PipelineDeps {
        PipelineDeps {
            fetcher: self.fetcher.clone(),
            raster_surface: Arc::new(EchoSurface),
            timing: MaterializerTiming::defaults(),
            rasterizer: self.rasterizer.clone(),
            saver: self.saver.clone(),
            notifier: self.notifier.clone(),
            preview_surface: self.preview.clone(),
            preview_settle: Duration::from_millis(500),
        }
    }
}
