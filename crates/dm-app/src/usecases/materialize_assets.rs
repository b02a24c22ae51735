//! Make a rendered subtree's images self-contained.
//! 将已渲染子树中的图片转换为自包含的 data URI。
//!
//! Two awaited barriers, in this order:
//!
//! 1. load barrier: every image settles (load or error), then `load_settle`
//! 2. conversion barrier: every non-inline image is materialized through the
//!    session cache and its source swapped in place, then `convert_settle`
//!
//! Sibling images run concurrently inside each barrier. A failing image is
//! logged and left untouched; only a vanished subtree fails the call.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, info_span, warn, Instrument};

use dm_core::materialize::{
    CacheLookup, ImageOutcome, MaterializationCache, MaterializationReport, SkipReason,
    SkippedAsset,
};
use dm_core::ports::{AssetFetcherPort, ImageElementPort, RasterSurfacePort, RenderedSubtreePort};
use dm_core::{MaterializedAsset, ResourceReference, SubtreeId};

/// Settling delays and the per-image fetch bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializerTiming {
    /// Grace period after every load signal resolved; a load event does not
    /// guarantee a paint-ready bitmap.
    pub load_settle: Duration,
    /// Grace period after the sources were swapped.
    pub convert_settle: Duration,
    /// Upper bound for one image fetch.
    pub fetch_timeout: Duration,
}

impl MaterializerTiming {
    pub fn defaults() -> Self {
        Self {
            load_settle: Duration::from_millis(800),
            convert_settle: Duration::from_millis(300),
            fetch_timeout: Duration::from_millis(15_000),
        }
    }
}

impl Default for MaterializerTiming {
    fn default() -> Self {
        Self::defaults()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("subtree {subtree} is unavailable: {reason}")]
    SubtreeUnavailable { subtree: SubtreeId, reason: String },
}

/// Asset materializer.
pub struct MaterializeAssetsUseCase {
    fetcher: Arc<dyn AssetFetcherPort>,
    surface: Arc<dyn RasterSurfacePort>,
    timing: MaterializerTiming,
}

impl MaterializeAssetsUseCase {
    pub fn new(
        fetcher: Arc<dyn AssetFetcherPort>,
        surface: Arc<dyn RasterSurfacePort>,
        timing: MaterializerTiming,
    ) -> Self {
        Self {
            fetcher,
            surface,
            timing,
        }
    }

    pub fn timing(&self) -> MaterializerTiming {
        self.timing
    }

    pub async fn execute(
        &self,
        subtree: &dyn RenderedSubtreePort,
        cache: &MaterializationCache,
    ) -> Result<MaterializationReport, MaterializeError> {
        let span = info_span!(
            "usecase.materialize_assets.execute",
            subtree = %subtree.id()
        );

        async {
            let images = subtree
                .images()
                .map_err(|err| MaterializeError::SubtreeUnavailable {
                    subtree: subtree.id().clone(),
                    reason: format!("{err:#}"),
                })?;

            if images.is_empty() {
                debug!("No images in subtree");
                return Ok(MaterializationReport::default());
            }

            join_all(images.iter().map(|image| image.wait_settled())).await;
            debug!(images = images.len(), "Load barrier passed");
            sleep(self.timing.load_settle).await;

            let outcomes = join_all(
                images
                    .iter()
                    .map(|image| self.convert_image(image.as_ref(), cache)),
            )
            .await;
            sleep(self.timing.convert_settle).await;

            let report: MaterializationReport = outcomes.into_iter().collect();
            info!(
                images = report.images_seen,
                converted = report.converted,
                reused = report.reused,
                already_inline = report.already_inline,
                skipped = report.skipped.len(),
                "Materialization finished"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    async fn convert_image(
        &self,
        image: &dyn ImageElementPort,
        cache: &MaterializationCache,
    ) -> ImageOutcome {
        let Some(reference) = image.src() else {
            return ImageOutcome::Empty;
        };
        if reference.is_empty() {
            return ImageOutcome::Empty;
        }
        if reference.is_inline() {
            return ImageOutcome::AlreadyInline;
        }

        let lookup = cache
            .get_or_materialize(&reference, || self.materialize(&reference))
            .await;

        let (asset, lookup) = match lookup {
            Ok(found) => found,
            Err(reason) => {
                warn!(
                    reference = %reference,
                    reason = ?reason,
                    "Image left un-inlined"
                );
                return ImageOutcome::Skipped(SkippedAsset { reference, reason });
            }
        };

        if let Err(err) = image.set_src(&asset) {
            warn!(reference = %reference, error = %err, "Failed to swap image source");
            return ImageOutcome::Skipped(SkippedAsset {
                reference,
                reason: SkipReason::SetSource(err.to_string()),
            });
        }

        match lookup {
            CacheLookup::Miss => ImageOutcome::Converted,
            CacheLookup::Hit => ImageOutcome::Reused,
        }
    }

    async fn materialize(
        &self,
        reference: &ResourceReference,
    ) -> Result<MaterializedAsset, SkipReason> {
        let fetched = match timeout(self.timing.fetch_timeout, self.fetcher.fetch(reference)).await
        {
            Err(_) => return Err(SkipReason::Timeout),
            Ok(Err(err)) => return Err(SkipReason::Fetch(format!("{err:#}"))),
            Ok(Ok(fetched)) => fetched,
        };

        self.surface
            .draw(&fetched)
            .await
            .map_err(|err| SkipReason::Draw(format!("{err:#}")))
    }
}
