use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

use super::ResourceReference;

/// Raw bytes returned by the asset fetcher for one reference.
/// 资源获取器返回的原始字节。
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub reference: ResourceReference,
    /// Content type declared by the server, if any.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FetchedAsset {
    pub fn new(
        reference: ResourceReference,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            reference,
            content_type,
            bytes: bytes.into(),
        }
    }
}

/// Self-contained `data:` URI for a materialized image.
/// 物化后的自包含 `data:` URI。
///
/// Cheap to clone; every image sharing a reference gets the same string.
#[derive(Clone, PartialEq, Eq)]
pub struct MaterializedAsset(Arc<str>);

impl MaterializedAsset {
    /// Encode `bytes` as a base64 data URI with the given MIME type.
    pub fn from_encoded(mime_type: &str, bytes: &[u8]) -> Self {
        let encoded = BASE64.encode(bytes);
        Self(format!("data:{mime_type};base64,{encoded}").into())
    }

    /// Wrap an existing data URI. Returns `None` for anything else.
    pub fn from_data_uri(uri: impl Into<String>) -> Option<Self> {
        let uri = uri.into();
        if ResourceReference::from(uri.as_str()).is_inline() {
            Some(Self(uri.into()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type embedded in the URI header (`data:<mime>;base64,`).
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split(',').next()?;
        let mime = header.split(';').next()?;
        if mime.is_empty() {
            None
        } else {
            Some(mime)
        }
    }

    /// Decode the payload back into bytes (base64 payloads only).
    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        let (header, payload) = self
            .0
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("data URI without payload separator"))?;
        if !header.ends_with(";base64") {
            anyhow::bail!("data URI payload is not base64");
        }
        Ok(BASE64.decode(payload)?)
    }
}

impl fmt::Debug for MaterializedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterializedAsset")
            .field("mime_type", &self.mime_type())
            .field("len", &self.0.len())
            .finish()
    }
}
