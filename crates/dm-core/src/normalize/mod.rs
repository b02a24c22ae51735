//! # URL Normalizer / URL 规范化
//!
//! Rewrites filesystem-style image references inside a raw HTML snapshot into
//! HTTP references served by the asset server, so a sandboxed preview surface
//! can resolve them.
//! 将 HTML 快照中的文件系统路径引用改写为资源服务器的 HTTP 地址。
//!
//! Unrecognized references pass through untouched (fail-open). The output never
//! contains the `file:///` scheme for a recognized reference, so running the
//! normalizer twice is a no-op.

mod origin;
mod upload;

pub use origin::AssetOrigin;
pub use upload::upload_file_url;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A `file:///` reference ends at a quote, whitespace or a closing paren
/// (the latter covers CSS `url(...)`).
static FILE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"file:///[^"'\s)]+"#).expect("valid file reference pattern"));

/// Container prefix the backend stores static assets under.
static STATIC_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:apps[/\\])?Static[/\\](.+)$").expect("valid static segment pattern")
});

/// Rewrite every recognized `file:///…/Static/<path>` reference in `html` to
/// `<origin>/static/<path>`.
pub fn normalize_html(html: &str, origin: &AssetOrigin) -> String {
    FILE_REFERENCE
        .replace_all(html, |caps: &Captures<'_>| {
            let reference = &caps[0];
            match rewrite_reference(reference, origin) {
                Some(rewritten) => rewritten,
                None => reference.to_string(),
            }
        })
        .into_owned()
}

/// Rewrite a single `file:///` reference; `None` when it has no `Static/` segment.
pub fn rewrite_reference(reference: &str, origin: &AssetOrigin) -> Option<String> {
    let caps = STATIC_SEGMENT.captures(reference)?;
    let relative_path = caps[1].replace('\\', "/");
    Some(origin.static_url(&relative_path))
}
