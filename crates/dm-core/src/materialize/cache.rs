//! Session-scoped materialization cache.
//! 会话级物化缓存。
//!
//! Append-only: an entry, once written, is reused verbatim until the owning
//! session closes. Each reference owns a [`OnceCell`], so concurrent lookups
//! of the same missing reference share one in-flight materialization and
//! never observe a half-written entry. A failed materialization leaves the
//! cell empty; the next lookup tries again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::document::{MaterializedAsset, ResourceReference};

/// Whether a lookup was served from the cache or produced a fresh entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Miss,
}

/// Mapping from [`ResourceReference`] to [`MaterializedAsset`].
#[derive(Default)]
pub struct MaterializationCache {
    entries: Mutex<HashMap<ResourceReference, Arc<OnceCell<MaterializedAsset>>>>,
}

impl MaterializationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached asset for `reference`, if one has been materialized.
    pub async fn get(&self, reference: &ResourceReference) -> Option<MaterializedAsset> {
        let entries = self.entries.lock().await;
        entries.get(reference).and_then(|cell| cell.get().cloned())
    }

    /// Return the cached asset, or run `materialize` exactly once across all
    /// concurrent callers for this reference and store its result.
    pub async fn get_or_materialize<F, Fut, E>(
        &self,
        reference: &ResourceReference,
        materialize: F,
    ) -> Result<(MaterializedAsset, CacheLookup), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MaterializedAsset, E>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(reference.clone()).or_default())
        };

        if let Some(asset) = cell.get() {
            return Ok((asset.clone(), CacheLookup::Hit));
        }

        let mut ran = false;
        let asset = cell
            .get_or_try_init(|| {
                ran = true;
                materialize()
            })
            .await?
            .clone();

        let lookup = if ran {
            #[cfg(feature = "tracing")]
            tracing::debug!(reference = %reference, "materialization cached");
            CacheLookup::Miss
        } else {
            CacheLookup::Hit
        };
        Ok((asset, lookup))
    }

    /// Store `asset` unless the reference is already cached; returns the
    /// value that ends up in the cache (first write wins).
    pub async fn insert(
        &self,
        reference: ResourceReference,
        asset: MaterializedAsset,
    ) -> MaterializedAsset {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(reference).or_default())
        };
        cell.get_or_init(|| async { asset }).await.clone()
    }

    pub async fn contains(&self, reference: &ResourceReference) -> bool {
        self.get(reference).await.is_some()
    }

    /// Number of materialized entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry. Only called when the owning session closes.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
