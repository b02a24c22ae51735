use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP origin of the asset server, without trailing slash.
/// 资源服务器的 HTTP 源（不带结尾斜杠）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOrigin(String);

impl AssetOrigin {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self(origin.trim_end_matches('/').to_string())
    }

    /// Derive the asset origin from the REST API base URL by dropping the
    /// first `/api` segment, e.g. `https://host/api` → `https://host`.
    pub fn from_api_base_url(api_base_url: &str) -> Self {
        Self::new(api_base_url.replacen("/api", "", 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<origin>/static/<relative_path>`
    pub fn static_url(&self, relative_path: &str) -> String {
        format!("{}/static/{}", self.0, relative_path.trim_start_matches('/'))
    }
}

impl fmt::Display for AssetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
