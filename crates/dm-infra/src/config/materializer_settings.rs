use std::time::Duration;

use serde::Deserialize;

use dm_core::PipelineConfig;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaterializerSettings {
    /// 加载屏障之后的等待时间（毫秒）
    pub load_settle_ms: u64,
    /// 转换屏障之后的等待时间（毫秒）
    pub convert_settle_ms: u64,
    /// 单张图片获取超时（毫秒）
    pub fetch_timeout_ms: u64,
    /// 预览渲染后的等待时间（毫秒）
    pub preview_settle_ms: u64,
}

impl MaterializerSettings {
    /// v1 默认值（**非常重要：永远保留**）
    pub fn defaults() -> Self {
        Self {
            load_settle_ms: 800,
            convert_settle_ms: 300,
            fetch_timeout_ms: 15_000,
            preview_settle_ms: 500,
        }
    }

    /// Overlay the non-zero values of `config`; zero means "not configured".
    pub fn from_config(config: &PipelineConfig) -> Self {
        let defaults = Self::defaults();
        let pick = |configured: u64, default: u64| {
            if configured == 0 {
                default
            } else {
                configured
            }
        };
        Self {
            load_settle_ms: pick(config.load_settle_ms, defaults.load_settle_ms),
            convert_settle_ms: pick(config.convert_settle_ms, defaults.convert_settle_ms),
            fetch_timeout_ms: pick(config.fetch_timeout_ms, defaults.fetch_timeout_ms),
            preview_settle_ms: defaults.preview_settle_ms,
        }
    }

    pub fn load_settle(&self) -> Duration {
        Duration::from_millis(self.load_settle_ms)
    }

    pub fn convert_settle(&self) -> Duration {
        Duration::from_millis(self.convert_settle_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn preview_settle(&self) -> Duration {
        Duration::from_millis(self.preview_settle_ms)
    }
}
