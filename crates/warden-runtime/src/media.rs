//! HTTP media fetching for image fingerprints.

use async_trait::async_trait;
use bytes::Bytes;

use warden_core::error::MediaError;
use warden_core::traits::MediaFetcher;

/// Fetches image resources over HTTP. Resource references are URLs issued
/// by the chat platform's CDN.
#[derive(Default, Clone)]
pub struct HttpMediaFetcher {
    client: reqwest::Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, resource: &str) -> Result<Bytes, MediaError> {
        let failed = |reason: String| MediaError::FetchFailed {
            resource: resource.to_string(),
            reason,
        };

        let response = self
            .client
            .get(resource)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?
            .error_for_status()
            .map_err(|e| failed(e.to_string()))?;

        response.bytes().await.map_err(|e| failed(e.to_string()))
    }
}
