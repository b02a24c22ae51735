//! Command entry points: resolve the effective configuration, open a
//! session, drive it, close it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{info, warn};

use dm_app::DocumentSession;
use dm_core::export::{certificate_filename, form_filename, FormKind};
use dm_core::normalize::upload_file_url;
use dm_core::{normalize_html, AssetOrigin, ExportJob, PipelineConfig, Snapshot, SubtreeId};
use dm_infra::{FilePreviewSurface, MarkupDocument};

use super::wiring::wire_dependencies;
use crate::adapters::LogNotifier;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub auth_token: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub preview_dir: Option<PathBuf>,
    pub rasterizer_command: Option<String>,
    pub print_command: Option<String>,
}

/// What the exported file is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    Filename(String),
    Form {
        kind: FormKind,
        candidate_id: Option<String>,
    },
    Certificate(String),
}

impl ExportTarget {
    pub fn filename(&self) -> String {
        match self {
            ExportTarget::Filename(name) => name.clone(),
            ExportTarget::Form { kind, candidate_id } => {
                form_filename(*kind, candidate_id.as_deref())
            }
            ExportTarget::Certificate(name) => certificate_filename(name),
        }
    }
}

/// File values, then command-line overrides, then platform directories for
/// whatever is still empty.
pub fn effective_config(file: Option<PipelineConfig>, overrides: &Overrides) -> Result<PipelineConfig> {
    let config = apply_overrides(file.unwrap_or_else(PipelineConfig::empty), overrides);
    let download_dir = dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("docmat");
    let config = fill_system_defaults(
        config,
        PipelineConfig::with_system_defaults(download_dir, cache_dir),
    );

    if config.api_base_url.trim().is_empty() {
        bail!("API base URL is not configured (set [api] base_url or pass --api-base-url)");
    }
    Ok(config)
}

fn apply_overrides(mut config: PipelineConfig, overrides: &Overrides) -> PipelineConfig {
    if let Some(value) = &overrides.api_base_url {
        config.api_base_url = value.clone();
    }
    if let Some(value) = &overrides.auth_token {
        config.auth_token = value.clone();
    }
    if let Some(value) = &overrides.output_dir {
        config.output_dir = value.clone();
    }
    if let Some(value) = &overrides.preview_dir {
        config.preview_dir = value.clone();
    }
    if let Some(value) = &overrides.rasterizer_command {
        config.rasterizer_command = value.clone();
    }
    if let Some(value) = &overrides.print_command {
        config.print_command = value.clone();
    }
    config
}

fn fill_system_defaults(mut config: PipelineConfig, defaults: PipelineConfig) -> PipelineConfig {
    if config.output_dir.as_os_str().is_empty() {
        config.output_dir = defaults.output_dir;
    }
    if config.preview_dir.as_os_str().is_empty() {
        config.preview_dir = defaults.preview_dir;
    }
    config
}

async fn open_session(config: &PipelineConfig, snapshot_path: &Path) -> Result<DocumentSession> {
    let html = tokio::fs::read_to_string(snapshot_path)
        .await
        .with_context(|| format!("Failed to read snapshot: {}", snapshot_path.display()))?;
    let origin = AssetOrigin::from_api_base_url(&config.api_base_url);
    let deps = wire_dependencies(config, &origin, Arc::new(LogNotifier::stdout()))?;
    Ok(DocumentSession::open(Snapshot::from(html), origin, deps))
}

pub async fn run_preview(config: &PipelineConfig, snapshot_path: &Path, zoom: Option<u16>) -> Result<()> {
    let session = open_session(config, snapshot_path).await?;
    let result = session.render_preview().await;
    if let Some(percent) = zoom {
        session.set_zoom(percent);
    }
    let zoom = session.zoom();
    session.close().await;
    result?;

    let host = FilePreviewSurface::new(&config.preview_dir).host_path();
    println!(
        "{}",
        json!({
            "preview": host,
            "zoom": zoom.percent(),
            "transform": zoom.css_transform(),
        })
    );
    Ok(())
}

pub async fn run_export(
    config: &PipelineConfig,
    snapshot_path: &Path,
    target: &ExportTarget,
    print_on_failure: bool,
) -> Result<()> {
    let session = open_session(config, snapshot_path).await?;

    // The export operates on the rendered (normalized) document.
    let rendered = normalize_html(session.snapshot().as_str(), session.origin());
    let document = Arc::new(MarkupDocument::parse_loaded(SubtreeId::new(), rendered));
    let job = ExportJob::new(document, target.filename());
    info!(job_id = %job.id, filename = %job.filename, "Export requested");

    let result = session.export(&job).await;
    if result.is_err() && print_on_failure {
        warn!("Export failed, falling back to native print");
        if let Err(err) = print_preview(&session).await {
            warn!(error = %err, "Print fallback failed");
        }
    }
    session.close().await;
    result?;
    Ok(())
}

pub async fn run_print(config: &PipelineConfig, snapshot_path: &Path) -> Result<()> {
    let session = open_session(config, snapshot_path).await?;
    let result = print_preview(&session).await;
    session.close().await;
    result
}

async fn print_preview(session: &DocumentSession) -> Result<()> {
    session.render_preview().await?;
    session.print_fallback().await?;
    Ok(())
}

pub fn run_resolve_upload(config: &PipelineConfig, file_path: &str) -> Result<String> {
    upload_file_url(&config.api_base_url, file_path)
        .with_context(|| format!("Cannot resolve upload path: {file_path:?}"))
}
