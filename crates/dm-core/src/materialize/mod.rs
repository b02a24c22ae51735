//! Materialization domain: the per-session asset cache and the outcome report.
//! 物化领域：会话级资源缓存与结果报告。

mod cache;
mod report;

pub use cache::{CacheLookup, MaterializationCache};
pub use report::{ImageOutcome, MaterializationReport, SkipReason, SkippedAsset};
