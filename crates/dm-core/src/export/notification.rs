use serde::Serialize;
use std::path::PathBuf;

use crate::ids::JobId;
use crate::materialize::MaterializationReport;

/// User-facing message for a failed export.
pub const EXPORT_FAILED_MESSAGE: &str = "PDF download failed. Please use the Print button instead.";

/// Recovery path offered alongside a failed export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackSuggestion {
    /// Native print dialog on the currently rendered preview surface.
    NativePrint,
}

/// Single success/failure signal emitted per export attempt.
/// 每次导出尝试只发出一次的成功/失败信号。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportNotification {
    Succeeded {
        job_id: JobId,
        filename: String,
        location: PathBuf,
        report: MaterializationReport,
    },
    Failed {
        job_id: JobId,
        message: String,
        /// Underlying cause, for diagnostics.
        cause: String,
        fallback: FallbackSuggestion,
    },
}

impl ExportNotification {
    pub fn failed(job_id: JobId, cause: impl Into<String>) -> Self {
        ExportNotification::Failed {
            job_id,
            message: EXPORT_FAILED_MESSAGE.to_string(),
            cause: cause.into(),
            fallback: FallbackSuggestion::NativePrint,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExportNotification::Succeeded { .. })
    }

    pub fn job_id(&self) -> &JobId {
        match self {
            ExportNotification::Succeeded { job_id, .. } | ExportNotification::Failed { job_id, .. } => {
                job_id
            }
        }
    }
}
