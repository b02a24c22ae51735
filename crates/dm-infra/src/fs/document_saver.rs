use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;

use dm_core::ports::DocumentSaverPort;

/// Saves exported documents into a download directory.
///
/// Writes go to a hidden temp file first and are renamed into place, so a
/// partially written document is never visible under its final name. An
/// existing file is never overwritten; a ` (n)` suffix is added instead.
pub struct FsDocumentSaver {
    dir: PathBuf,
}

impl FsDocumentSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn available_path(&self, filename: &str) -> Result<PathBuf> {
        let candidate = self.dir.join(filename);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }

        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        let extension = path.extension().and_then(|e| e.to_str());
        for n in 1..=u32::MAX {
            let name = match extension {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            let candidate = self.dir.join(name);
            if !tokio::fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        bail!("no free filename left for {filename}")
    }
}

#[async_trait]
impl DocumentSaverPort for FsDocumentSaver {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        validate_filename(filename)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create download directory {}", self.dir.display()))?;

        let target = self.available_path(filename).await?;
        let tmp = self.dir.join(format!(".{filename}.part"));

        commit(&tmp, &target, bytes).await?;

        info!(path = %target.display(), bytes = bytes.len(), "Document saved");
        Ok(target)
    }
}

/// Write `bytes` to `tmp` and move it onto `target`. On any failure the
/// temp file is removed.
async fn commit(tmp: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
    let result = async {
        tokio::fs::write(tmp, bytes)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(tmp, target)
            .await
            .with_context(|| format!("move document to {}", target.display()))
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(tmp).await;
    }
    result
}

fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        bail!("empty filename");
    }
    if filename.contains(['/', '\\']) || filename == "." || filename == ".." {
        bail!("filename must not contain path separators: {filename}");
    }
    Ok(())
}
