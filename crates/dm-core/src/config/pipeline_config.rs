use std::path::PathBuf;

/// Pipeline configuration DTO (pure data, no logic)
/// 管线配置 DTO（纯数据，无逻辑）
///
/// Missing values map to empty strings / zero: those are facts, the
/// bootstrap layer decides what an empty value means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// REST API base URL, e.g. `https://host/api`
    pub api_base_url: String,

    /// Bearer token sent with asset fetches (may be empty)
    pub auth_token: String,

    /// Directory the preview surface writes normalized documents into
    pub preview_dir: PathBuf,

    /// Command used for the native-print fallback
    pub print_command: String,

    /// Directory exported documents are saved to
    pub output_dir: PathBuf,

    /// External HTML → PDF command
    pub rasterizer_command: String,

    /// Settling delay after the load barrier, in milliseconds
    pub load_settle_ms: u64,

    /// Settling delay after the conversion barrier, in milliseconds
    pub convert_settle_ms: u64,

    /// Per-image fetch timeout, in milliseconds
    pub fetch_timeout_ms: u64,
}

impl PipelineConfig {
    /// Create PipelineConfig from TOML value
    /// 从 TOML 值创建 PipelineConfig
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| -> String {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let u64_at = |section: &str, key: &str| -> u64 {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .and_then(|v| u64::try_from(v).ok())
                .unwrap_or(0)
        };

        Ok(Self {
            api_base_url: str_at("api", "base_url"),
            auth_token: str_at("api", "auth_token"),
            preview_dir: PathBuf::from(str_at("preview", "dir")),
            print_command: str_at("preview", "print_command"),
            output_dir: PathBuf::from(str_at("export", "output_dir")),
            rasterizer_command: str_at("export", "rasterizer_command"),
            load_settle_ms: u64_at("materializer", "load_settle_ms"),
            convert_settle_ms: u64_at("materializer", "convert_settle_ms"),
            fetch_timeout_ms: u64_at("materializer", "fetch_timeout_ms"),
        })
    }

    /// Create empty PipelineConfig (all empty/default values)
    /// 创建空的 PipelineConfig
    pub fn empty() -> Self {
        Self {
            api_base_url: String::new(),
            auth_token: String::new(),
            preview_dir: PathBuf::new(),
            print_command: String::new(),
            output_dir: PathBuf::new(),
            rasterizer_command: String::new(),
            load_settle_ms: 0,
            convert_settle_ms: 0,
            fetch_timeout_ms: 0,
        }
    }

    /// Config with directories rooted at caller-computed platform paths.
    ///
    /// The directories should come from platform logic (e.g. the `dirs` crate).
    pub fn with_system_defaults(download_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            preview_dir: cache_dir.join("preview"),
            output_dir: download_dir,
            ..Self::empty()
        }
    }
}
