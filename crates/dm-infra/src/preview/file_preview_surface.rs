use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use dm_core::ports::PreviewSurfacePort;
use dm_core::SandboxPolicy;

const HOST_FILE: &str = "index.html";
const DOCUMENT_FILE: &str = "document.html";

/// Preview surface backed by a directory.
///
/// `render` writes the normalized document plus a host page that embeds it in
/// a sandboxed iframe; `print` hands the document to the print command.
pub struct FilePreviewSurface {
    dir: PathBuf,
    print_command: Option<String>,
    rendered: Mutex<Option<PathBuf>>,
}

impl FilePreviewSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            print_command: None,
            rendered: Mutex::new(None),
        }
    }

    /// Whitespace-separated command; the document path is appended.
    pub fn with_print_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        self.print_command = (!command.trim().is_empty()).then_some(command);
        self
    }

    pub fn host_path(&self) -> PathBuf {
        self.dir.join(HOST_FILE)
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    fn rendered_document(&self) -> Option<PathBuf> {
        self.rendered
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl PreviewSurfacePort for FilePreviewSurface {
    async fn render(&self, html: &str, sandbox: &SandboxPolicy) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create preview directory {}", self.dir.display()))?;

        let document = self.document_path();
        tokio::fs::write(&document, html)
            .await
            .with_context(|| format!("write {}", document.display()))?;

        let host = self.host_path();
        tokio::fs::write(&host, host_page(html, sandbox))
            .await
            .with_context(|| format!("write {}", host.display()))?;

        *self.rendered.lock().unwrap_or_else(|p| p.into_inner()) = Some(document);
        info!(path = %host.display(), "Preview rendered");
        Ok(())
    }

    async fn print(&self) -> Result<()> {
        let document = self
            .rendered_document()
            .ok_or_else(|| anyhow!("nothing has been rendered to print"))?;
        let command = self
            .print_command
            .as_deref()
            .ok_or_else(|| anyhow!("no print command configured"))?;

        run_print_command(command, &document).await
    }
}

async fn run_print_command(command: &str, document: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("print command is empty"))?;

    let status = Command::new(program)
        .args(parts)
        .arg(document)
        .stdin(Stdio::null())
        .status()
        .await
        .with_context(|| format!("spawn print command `{program}`"))?;
    if !status.success() {
        return Err(anyhow!("print command `{program}` exited with {status}"));
    }
    info!(document = %document.display(), "Document sent to printer");
    Ok(())
}

fn host_page(html: &str, sandbox: &SandboxPolicy) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Preview</title>\
         <style>html, body {{ margin: 0; height: 100%; }} \
         iframe {{ border: 0; width: 100%; height: 100%; transform-origin: top center; }}</style>\
         </head><body><iframe sandbox=\"{sandbox}\" srcdoc=\"{doc}\"></iframe></body></html>\n",
        doc = escape_srcdoc(html),
    )
}

fn escape_srcdoc(html: &str) -> String {
    html.replace('&', "&amp;").replace('"', "&quot;")
}
