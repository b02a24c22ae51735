//! Credentialed asset fetches over HTTP(S).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use tracing::debug;

use dm_core::ports::AssetFetcherPort;
use dm_core::{AssetOrigin, FetchedAsset, ResourceReference};

pub struct HttpAssetFetcher {
    client: reqwest::Client,
    /// Relative references resolve against this.
    base: Option<Url>,
    auth_token: Option<String>,
}

impl HttpAssetFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client for asset fetches")?;
        Ok(Self {
            client,
            base: None,
            auth_token: None,
        })
    }

    /// Resolve relative references against the asset origin.
    pub fn with_origin(mut self, origin: &AssetOrigin) -> Result<Self> {
        let base = Url::parse(&format!("{}/", origin.as_str()))
            .with_context(|| format!("invalid asset origin: {origin}"))?;
        self.base = Some(base);
        Ok(self)
    }

    /// Send `Authorization: Bearer <token>`; empty tokens are ignored.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = (!token.trim().is_empty()).then_some(token);
        self
    }

    fn resolve(&self, reference: &ResourceReference) -> Result<Url> {
        let raw = reference.as_str().trim();
        if reference.is_http() {
            return Url::parse(raw).with_context(|| format!("invalid asset URL: {raw}"));
        }
        if raw.contains("://") {
            return Err(anyhow!("unsupported asset scheme: {raw}"));
        }
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| anyhow!("relative asset reference without an origin: {raw}"))?;
        base.join(raw.trim_start_matches('/'))
            .with_context(|| format!("cannot resolve {raw} against {base}"))
    }
}

#[async_trait]
impl AssetFetcherPort for HttpAssetFetcher {
    async fn fetch(&self, reference: &ResourceReference) -> Result<FetchedAsset> {
        let url = self.resolve(reference)?;

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("GET {url}: unexpected status {status}"));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("read body of {url}"))?;

        debug!(url = %url, bytes = bytes.len(), "Fetched asset");
        Ok(FetchedAsset::new(reference.clone(), content_type, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn fetcher() -> HttpAssetFetcher {
        HttpAssetFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_bytes_and_content_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/static/photos/a.png")
            .with_status(200)
            .with_header("content-type", "image/png; charset=binary")
            .with_body([0x89, b'P', b'N', b'G'])
            .create_async()
            .await;

        let reference = ResourceReference::from(format!("{}/static/photos/a.png", server.url()));
        let asset = fetcher().fetch(&reference).await.unwrap();

        mock.assert_async().await;
        assert_eq!(asset.content_type.as_deref(), Some("image/png"));
        assert_eq!(&asset.bytes[..], &[0x89, b'P', b'N', b'G']);
        assert_eq!(asset.reference, reference);
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/static/a.png")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_body("x")
            .create_async()
            .await;

        let reference = ResourceReference::from(format!("{}/static/a.png", server.url()));
        fetcher()
            .with_auth_token("t0ken")
            .fetch(&reference)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let reference = ResourceReference::from(format!("{}/static/missing.png", server.url()));
        let err = fetcher().fetch(&reference).await.unwrap_err();

        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_relative_reference_uses_origin() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/static/b.png")
            .with_status(200)
            .with_body("b")
            .create_async()
            .await;

        let origin = AssetOrigin::new(server.url());
        let asset = fetcher()
            .with_origin(&origin)
            .unwrap()
            .fetch(&ResourceReference::from("/static/b.png"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(&asset.bytes[..], b"b");
    }

    #[tokio::test]
    async fn test_file_scheme_is_rejected() {
        let err = fetcher()
            .fetch(&ResourceReference::from("file:///tmp/x.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }
}
