use serde::{Deserialize, Serialize};
use std::fmt;

const INLINE_SCHEME: &str = "data:";

/// Where an image comes from: a filesystem-style path or an HTTP(S) URL.
/// 图片来源引用：文件系统路径或 HTTP(S) URL。
///
/// Used verbatim as the materialization cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceReference(String);

impl ResourceReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Already self-contained (`data:` URI); never fetched.
    pub fn is_inline(&self) -> bool {
        self.0
            .get(..INLINE_SCHEME.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(INLINE_SCHEME))
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn is_http(&self) -> bool {
        let lower = self.0.trim_start().to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }

    /// Whether the materializer has to convert this reference.
    pub fn needs_materialization(&self) -> bool {
        !self.is_empty() && !self.is_inline()
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceReference {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceReference {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_detection_is_case_insensitive() {
        assert!(ResourceReference::from("data:image/png;base64,AAAA").is_inline());
        assert!(ResourceReference::from("DATA:image/png;base64,AAAA").is_inline());
        assert!(!ResourceReference::from("https://cdn.x/a.png").is_inline());
        assert!(!ResourceReference::from("da").is_inline());
    }

    #[test]
    fn test_needs_materialization() {
        assert!(ResourceReference::from("https://cdn.x/a.png").needs_materialization());
        assert!(!ResourceReference::from("").needs_materialization());
        assert!(!ResourceReference::from("data:,").needs_materialization());
    }

    #[test]
    fn test_is_http() {
        assert!(ResourceReference::from("HTTPS://cdn.x/a.png").is_http());
        assert!(!ResourceReference::from("file:///apps/Static/a.png").is_http());
    }
}
