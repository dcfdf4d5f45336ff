use crate::errors::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use url::Url;

/// Transport to the remote post provider.
///
/// Implementations only move bytes, the envelope is handled by the fetcher.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Returns the raw response body for a single tag.
    async fn fetch_raw(&self, tag: &str) -> Result<Bytes, FetchError>;
}

/// Fetches posts over HTTP, one GET per tag with the tag as a query parameter.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSource {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpSource { client, endpoint })
    }
}

#[async_trait]
impl PostSource for HttpSource {
    async fn fetch_raw(&self, tag: &str) -> Result<Bytes, FetchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("tag", tag);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RemoteUnavailable(format!(
                "provider returned {status}"
            )));
        }

        Ok(response.bytes().await?)
    }
}
