use serde::Serialize;

use crate::document::ResourceReference;

/// Why an image was left with its original source.
/// 图片保留原始来源的原因。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The asset server refused or failed the fetch (404, missing CORS headers, network).
    Fetch(String),
    /// The bytes could not be decoded or drawn onto the raster surface.
    Draw(String),
    /// The fetch did not finish within the per-image timeout.
    Timeout,
    /// The element rejected the new source.
    SetSource(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
    pub reference: ResourceReference,
    pub reason: SkipReason,
}

/// Result of materializing one image element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// No source attribute, nothing to do.
    Empty,
    AlreadyInline,
    /// Materialized by this call.
    Converted,
    /// Served from the session cache.
    Reused,
    Skipped(SkippedAsset),
}

/// Per-call tally of what the materializer did.
/// 单次物化调用的统计结果。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializationReport {
    pub images_seen: usize,
    pub already_inline: usize,
    pub converted: usize,
    pub reused: usize,
    pub skipped: Vec<SkippedAsset>,
}

impl MaterializationReport {
    pub fn record(&mut self, outcome: ImageOutcome) {
        self.images_seen += 1;
        match outcome {
            ImageOutcome::Empty => {}
            ImageOutcome::AlreadyInline => self.already_inline += 1,
            ImageOutcome::Converted => self.converted += 1,
            ImageOutcome::Reused => self.reused += 1,
            ImageOutcome::Skipped(skipped) => self.skipped.push(skipped),
        }
    }

    /// Every image that needed conversion ended up inline.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// References that stayed un-inlined, in element order.
    pub fn skipped_references(&self) -> impl Iterator<Item = &ResourceReference> {
        self.skipped.iter().map(|s| &s.reference)
    }
}

impl FromIterator<ImageOutcome> for MaterializationReport {
    fn from_iter<I: IntoIterator<Item = ImageOutcome>>(iter: I) -> Self {
        let mut report = Self::default();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}
