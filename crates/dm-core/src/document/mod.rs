//! Document values flowing through the pipeline.
//! 流经管线的文档值对象。

mod asset;
mod reference;
mod snapshot;

pub use asset::{FetchedAsset, MaterializedAsset};
pub use reference::ResourceReference;
pub use snapshot::Snapshot;
