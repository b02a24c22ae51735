//! docmat: preview and export of HTML document snapshots.

pub mod adapters;
pub mod bootstrap;
