/// Preview zoom as a percentage, bounded and stepped.
/// 预览缩放百分比（有界、按步进调整）。
///
/// Zoom only scales the rendered surface; it never re-renders content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    percent: u16,
}

impl Zoom {
    pub const MIN: u16 = 50;
    pub const MAX: u16 = 200;
    pub const STEP: u16 = 10;
    pub const DEFAULT: u16 = 100;

    /// Clamps into `[MIN, MAX]`.
    pub fn new(percent: u16) -> Self {
        Self {
            percent: percent.clamp(Self::MIN, Self::MAX),
        }
    }

    pub fn percent(&self) -> u16 {
        self.percent
    }

    /// Visual scale factor, `percent / 100`.
    pub fn scale(&self) -> f32 {
        f32::from(self.percent) / 100.0
    }

    pub fn set(&mut self, percent: u16) -> u16 {
        *self = Self::new(percent);
        self.percent
    }

    pub fn zoom_in(&mut self) -> u16 {
        self.set(self.percent.saturating_add(Self::STEP))
    }

    pub fn zoom_out(&mut self) -> u16 {
        self.set(self.percent.saturating_sub(Self::STEP))
    }

    pub fn reset(&mut self) -> u16 {
        self.set(Self::DEFAULT)
    }

    pub fn can_zoom_in(&self) -> bool {
        self.percent < Self::MAX
    }

    pub fn can_zoom_out(&self) -> bool {
        self.percent > Self::MIN
    }

    /// CSS transform applied to the preview container.
    pub fn css_transform(&self) -> String {
        format!("scale({})", self.scale())
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}
