//! Export coordinator: materialize → rasterize → verify → save → notify.
//! 导出协调器：物化 → 栅格化 → 校验 → 保存 → 通知。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{error, info, info_span, warn, Instrument};

use dm_core::materialize::{MaterializationCache, MaterializationReport};
use dm_core::ports::{DocumentSaverPort, NotifierPort, RasterizerPort};
use dm_core::{ExportJob, ExportNotification, JobId, SubtreeId};

use super::materialize_assets::{MaterializeAssetsUseCase, MaterializeError};

const PDF_HEADER: &[u8] = b"%PDF-";
const PDF_TRAILER: &[u8] = b"%%EOF";
// Writers may append whitespace or a few bytes of garbage after the trailer.
const TRAILER_SEARCH_WINDOW: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("an export of subtree {0} is already in flight")]
    AlreadyInFlight(SubtreeId),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("rasterizer returned an incomplete document: {0}")]
    IncompleteOutput(String),

    #[error("saving {filename} failed: {reason}")]
    Deliver { filename: String, reason: String },
}

/// Delivered export.
#[derive(Debug, Clone)]
pub struct ExportSuccess {
    pub job_id: JobId,
    pub location: PathBuf,
    pub bytes_written: usize,
    pub report: MaterializationReport,
}

/// Sequences one export and reports a single outcome.
///
/// Exports of the same subtree are serialized through a busy flag; exports of
/// different subtrees run independently.
pub struct ExportDocumentUseCase {
    materializer: Arc<MaterializeAssetsUseCase>,
    rasterizer: Arc<dyn RasterizerPort>,
    saver: Arc<dyn DocumentSaverPort>,
    notifier: Arc<dyn NotifierPort>,
    in_flight: Arc<Mutex<HashSet<SubtreeId>>>,
}

impl ExportDocumentUseCase {
    pub fn new(
        materializer: Arc<MaterializeAssetsUseCase>,
        rasterizer: Arc<dyn RasterizerPort>,
        saver: Arc<dyn DocumentSaverPort>,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            materializer,
            rasterizer,
            saver,
            notifier,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// True while an export of `subtree` is running.
    pub fn is_busy(&self, subtree: &SubtreeId) -> bool {
        lock(&self.in_flight).contains(subtree)
    }

    pub async fn execute(
        &self,
        job: &ExportJob,
        cache: &MaterializationCache,
    ) -> Result<ExportSuccess, ExportError> {
        let span = info_span!(
            "usecase.export_document.execute",
            job_id = %job.id,
            subtree = %job.subtree_id(),
            filename = %job.filename,
        );

        async {
            let Some(_busy) = InFlightGuard::acquire(&self.in_flight, job.subtree_id()) else {
                warn!("Export already in flight for this subtree");
                return Err(ExportError::AlreadyInFlight(job.subtree_id().clone()));
            };

            match self.run(job, cache).await {
                Ok(success) => {
                    info!(
                        location = %success.location.display(),
                        bytes = success.bytes_written,
                        "Export delivered"
                    );
                    self.notifier.notify(&ExportNotification::Succeeded {
                        job_id: job.id.clone(),
                        filename: job.filename.clone(),
                        location: success.location.clone(),
                        report: success.report.clone(),
                    });
                    Ok(success)
                }
                Err(err) => {
                    error!(error = %err, "Export failed");
                    self.notifier
                        .notify(&ExportNotification::failed(job.id.clone(), err.to_string()));
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        job: &ExportJob,
        cache: &MaterializationCache,
    ) -> Result<ExportSuccess, ExportError> {
        let report = self
            .materializer
            .execute(job.subtree.as_ref(), cache)
            .await?;
        if !report.is_complete() {
            warn!(
                skipped = report.skipped.len(),
                "Exporting with un-inlined images"
            );
        }

        let bytes = self
            .rasterizer
            .rasterize(job.subtree.as_ref(), &job.options)
            .await
            .map_err(|err| ExportError::Rasterize(format!("{err:#}")))?;
        verify_complete(&bytes)?;

        let location = self
            .saver
            .save(&job.filename, &bytes)
            .await
            .map_err(|err| ExportError::Deliver {
                filename: job.filename.clone(),
                reason: format!("{err:#}"),
            })?;

        Ok(ExportSuccess {
            job_id: job.id.clone(),
            location,
            bytes_written: bytes.len(),
            report,
        })
    }
}

/// Reject anything that is not a whole PDF before it reaches the user.
fn verify_complete(bytes: &[u8]) -> Result<(), ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::IncompleteOutput("empty output".into()));
    }
    if !bytes.starts_with(PDF_HEADER) {
        return Err(ExportError::IncompleteOutput("missing PDF header".into()));
    }
    let tail_start = bytes.len().saturating_sub(TRAILER_SEARCH_WINDOW);
    let has_trailer = bytes[tail_start..]
        .windows(PDF_TRAILER.len())
        .any(|w| w == PDF_TRAILER);
    if !has_trailer {
        return Err(ExportError::IncompleteOutput("missing %%EOF trailer".into()));
    }
    Ok(())
}

fn lock(set: &Mutex<HashSet<SubtreeId>>) -> std::sync::MutexGuard<'_, HashSet<SubtreeId>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears the busy flag on every exit path.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<SubtreeId>>>,
    subtree: SubtreeId,
}

impl InFlightGuard {
    fn acquire(set: &Arc<Mutex<HashSet<SubtreeId>>>, subtree: &SubtreeId) -> Option<Self> {
        if !lock(set).insert(subtree.clone()) {
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            subtree: subtree.clone(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.subtree);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_complete_accepts_pdf() {
        assert!(verify_complete(b"%PDF-1.7\n1 0 obj\nendobj\n%%EOF\n").is_ok());
    }

    #[test]
    fn test_verify_complete_rejects_truncated_output() {
        let err = verify_complete(b"%PDF-1.7\n1 0 obj\n").unwrap_err();
        assert!(matches!(err, ExportError::IncompleteOutput(_)));
    }

    #[test]
    fn test_verify_complete_rejects_non_pdf() {
        assert!(verify_complete(b"<html></html>%%EOF").is_err());
        assert!(verify_complete(b"").is_err());
    }

    #[test]
    fn test_guard_clears_flag_on_drop() {
        let set = Arc::new(Mutex::new(HashSet::new()));
        let id = SubtreeId::from("form");

        let guard = InFlightGuard::acquire(&set, &id).unwrap();
        assert!(InFlightGuard::acquire(&set, &id).is_none());
        drop(guard);

        assert!(InFlightGuard::acquire(&set, &id).is_some());
    }
}
