use crate::core::error::IndexError;
use std::time::Duration;
use tracing::{debug, instrument};

/// Thin wrapper over `reqwest` that applies the request timeout and maps
/// transport and status failures to [`IndexError::SourceUnavailable`].
/// Requests are never retried.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("iclcalc/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, IndexError> {
        debug!("Requesting {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            IndexError::SourceUnavailable(format!("Request error: {e} for URL: {url}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::SourceUnavailable(format!(
                "HTTP error: {status} for URL: {url}"
            )));
        }
        Ok(response)
    }

    #[instrument(name = "HttpGetText", skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String, IndexError> {
        let response = self.send(url).await?;
        Ok(response.text().await?)
    }

    #[instrument(name = "HttpGetBytes", skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, IndexError> {
        let response = self.send(url).await?;
        let bytes = response.bytes().await?;
        debug!(len = bytes.len(), "Received body");
        Ok(bytes.to_vec())
    }
}
