//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (HTTP, image codec, commands, fs) / 创建 infra 层具体实现
//! - ✅ Inject them into `PipelineDeps` / 将依赖注入到 `PipelineDeps`
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! ❌ **No configuration validation / 禁止做配置验证**
//!
//! > **This is the only place allowed to depend on dm-infra + dm-app simultaneously.**
//! > **这是唯一允许同时依赖 dm-infra 和 dm-app 的地方。**

use std::sync::Arc;

use dm_app::{MaterializerTiming, PipelineDeps};
use dm_core::ports::NotifierPort;
use dm_core::{AssetOrigin, PipelineConfig};
use dm_infra::export::DEFAULT_COMMAND;
use dm_infra::{
    CommandRasterizer, FilePreviewSurface, FsDocumentSaver, HttpAssetFetcher,
    MaterializerSettings, PngRasterSurface,
};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),

    #[error("Rasterizer initialization failed: {0}")]
    Rasterizer(String),
}

/// Wire all ports for one session.
///
/// `config` must already carry its effective directories (see
/// [`crate::bootstrap::run::effective_config`]).
pub fn wire_dependencies(
    config: &PipelineConfig,
    origin: &AssetOrigin,
    notifier: Arc<dyn NotifierPort>,
) -> WiringResult<PipelineDeps> {
    let settings = MaterializerSettings::from_config(config);

    let fetcher = HttpAssetFetcher::new(settings.fetch_timeout())
        .and_then(|fetcher| fetcher.with_origin(origin))
        .map_err(|e| WiringError::HttpClient(format!("{e:#}")))?
        .with_auth_token(config.auth_token.clone());

    let rasterizer_command = if config.rasterizer_command.trim().is_empty() {
        DEFAULT_COMMAND
    } else {
        config.rasterizer_command.as_str()
    };
    let rasterizer = CommandRasterizer::from_command_line(rasterizer_command)
        .map_err(|e| WiringError::Rasterizer(format!("{e:#}")))?;

    let preview_surface =
        FilePreviewSurface::new(&config.preview_dir).with_print_command(config.print_command.clone());

    Ok(PipelineDeps {
        fetcher: Arc::new(fetcher),
        raster_surface: Arc::new(PngRasterSurface::new()),
        timing: MaterializerTiming {
            load_settle: settings.load_settle(),
            convert_settle: settings.convert_settle(),
            fetch_timeout: settings.fetch_timeout(),
        },
        rasterizer: Arc::new(rasterizer),
        saver: Arc::new(FsDocumentSaver::new(&config.output_dir)),
        notifier,
        preview_surface: Arc::new(preview_surface),
        preview_settle: settings.preview_settle(),
    })
}
