//! In-memory rendered subtree.
//! 内存中的已渲染子树。
//!
//! Markup is parsed with html5ever and kept as an owned tree. Every `<img>`
//! element carries a load state on a `watch` channel and can have its `src`
//! attribute swapped in place; [`MarkupDocument::to_html`] serializes the
//! tree with the current attributes.

mod document;
mod image;

pub use document::MarkupDocument;
pub use image::{LoadState, MarkupImage};
