use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Result};
use async_trait::async_trait;
use html5ever::serialize::Serializer;
use html5ever::{LocalName, Namespace, QualName};
use tokio::sync::watch;

use dm_core::ports::ImageElementPort;
use dm_core::{MaterializedAsset, ResourceReference};

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Attribute list of one element, values already entity-decoded.
pub(crate) type Attributes = Vec<(QualName, String)>;

/// Load progress of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    /// Load error; still counts as settled.
    Failed,
}

/// One `<img>` element of a [`MarkupDocument`](super::MarkupDocument).
pub struct MarkupImage {
    name: QualName,
    attrs: Mutex<Attributes>,
    swapped: AtomicBool,
    state: watch::Sender<LoadState>,
    attached: Arc<AtomicBool>,
}

impl MarkupImage {
    pub(crate) fn new(name: QualName, attrs: Attributes, attached: Arc<AtomicBool>) -> Self {
        let (state, _) = watch::channel(LoadState::Pending);
        Self {
            name,
            attrs: Mutex::new(attrs),
            swapped: AtomicBool::new(false),
            state,
            attached,
        }
    }

    pub fn load_state(&self) -> LoadState {
        *self.state.borrow()
    }

    pub fn mark_loaded(&self) {
        self.state.send_replace(LoadState::Loaded);
    }

    pub fn mark_failed(&self) {
        self.state.send_replace(LoadState::Failed);
    }

    /// True once the source was replaced by a materialized asset.
    pub fn is_swapped(&self) -> bool {
        self.swapped.load(Ordering::SeqCst)
    }

    /// Decoded value of the plain (un-namespaced) attribute `local`.
    pub fn attribute(&self, local: &str) -> Option<String> {
        self.lock_attrs()
            .iter()
            .find(|(name, _)| is_plain(name, local))
            .map(|(_, value)| value.clone())
    }

    pub(crate) fn serialize<S: Serializer>(&self, serializer: &mut S) -> io::Result<()> {
        let attrs = self.lock_attrs();
        serializer.start_elem(
            self.name.clone(),
            attrs.iter().map(|(name, value)| (name, value.as_str())),
        )?;
        serializer.end_elem(self.name.clone())
    }

    fn lock_attrs(&self) -> MutexGuard<'_, Attributes> {
        self.attrs.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl ImageElementPort for MarkupImage {
    fn src(&self) -> Option<ResourceReference> {
        self.attribute("src").map(ResourceReference::from)
    }

    fn set_src(&self, asset: &MaterializedAsset) -> Result<()> {
        if !self.attached.load(Ordering::SeqCst) {
            bail!("image element is no longer attached");
        }
        let mut attrs = self.lock_attrs();
        match attrs.iter_mut().find(|(name, _)| is_plain(name, "src")) {
            Some((_, value)) => *value = asset.as_str().to_string(),
            None => attrs.push((attribute_name("src"), asset.as_str().to_string())),
        }
        self.swapped.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_settled(&self) {
        let mut rx = self.state.subscribe();
        // the sender lives as long as `self`, so this cannot observe a closed channel
        let _ = rx.wait_for(|state| *state != LoadState::Pending).await;
    }
}

pub(crate) fn is_html_element(name: &QualName, local: &str) -> bool {
    &*name.ns == HTML_NAMESPACE && &*name.local == local
}

fn is_plain(name: &QualName, local: &str) -> bool {
    name.ns.is_empty() && &*name.local == local
}

pub(crate) fn html_element_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local))
}

fn attribute_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(local))
}
